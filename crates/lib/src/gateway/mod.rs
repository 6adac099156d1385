//! Gateway: HTTP trigger for the relay.
//!
//! `POST /invoke` takes a function-style envelope (`{"body": "..."}`) and answers with the
//! outcome JSON; `POST /webhook` takes the raw LINE webhook body and answers with the
//! outcome's status and body. `GET /` is a health probe.

mod server;

pub use server::{build_handler, router, run_gateway, GatewayState};
