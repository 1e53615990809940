pub mod iteration_stats;
pub mod loop_fn;
pub mod loss_history;
pub mod train_config;

pub use iteration_stats::IterationStats;
pub use loop_fn::sgd_loop;
pub use loss_history::LossHistory;
pub use train_config::TrainConfig;
