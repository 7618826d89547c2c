mod form;
mod submission;
mod validation;

pub use form::*;
pub use submission::*;
pub use validation::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "full")] {
        mod document;
        mod intake;
        mod store;

        pub use document::*;
        pub use intake::*;
        pub use store::*;
    }
}
