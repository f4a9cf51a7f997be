mod use_async_call;

pub use use_async_call::{UseAsyncCallHandle, use_async_call, use_async_call_with_policy};
