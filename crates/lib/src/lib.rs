//! replybot core library — LINE webhook decoding, OpenAI completion, reply chunking
//! and dispatch, and the gateway that triggers them. Used by the CLI.

pub mod channels;
pub mod chunk;
pub mod config;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod relay;
