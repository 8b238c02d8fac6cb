pub mod image_preloader;


pub use image_preloader::{
    DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE, DEFAULT_DEFERRED_DELAY, DEFAULT_PRIORITY_COUNT,
    ImagePreloader, PreloaderConfig, PriorityPreload,
};
