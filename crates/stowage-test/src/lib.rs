#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod mock;

pub use mock::{
    ExtractCall, MockClientProvider, MockStorage, RecordingExtractor, StorageCall,
};
