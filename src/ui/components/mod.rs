pub mod chip_picker;
pub mod kana_card;
pub mod kana_grid;
pub mod progress_bar;
