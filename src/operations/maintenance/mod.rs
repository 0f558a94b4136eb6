mod collect_garbage;

pub use collect_garbage::{CollectGarbage, GarbageReport};
