pub mod files;
pub mod store;

pub use files::{
    atomic_write, ensure_stint_dir, get_stint_dir, init_local_stint, meta_file, report_file,
    tasks_file,
};
pub use store::{Settings, Store};
