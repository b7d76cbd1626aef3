pub mod igeometry;
pub mod istates;
pub mod ipending;
pub mod ievents;

pub use igeometry::*;
pub use istates::*;
pub use ipending::*;
pub use ievents::*;

use chrono::{Local, NaiveDateTime};

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
