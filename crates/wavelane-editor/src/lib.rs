pub mod editor;
pub mod keyboard;
pub mod message;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
