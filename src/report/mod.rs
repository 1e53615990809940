pub mod loss_plot;
pub mod markdown;
pub mod weights_image;

pub use loss_plot::save_loss_plot;
pub use markdown::TrainingReport;
pub use weights_image::{save_weights_image, ImageLayout};
