pub mod options;

#[cfg(feature = "quote")]
pub mod channel;
