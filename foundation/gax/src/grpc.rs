pub use tonic::*;
