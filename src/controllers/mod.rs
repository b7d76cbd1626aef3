pub mod sliding_door;

pub use sliding_door::SlidingDoorController;
