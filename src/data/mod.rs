pub mod bar;
pub mod date_range;
pub mod loader;
pub mod series;

pub use bar::PriceBar;
pub use date_range::validate_date_range;
pub use loader::load_csv;
pub use series::PriceSeries;
