//! Fuzz target for request decoding and token verification.
//!
//! Feeds arbitrary methods, content types and bodies through the guard and
//! checks the token list invariants hold whatever the input.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};
use tokenguard_csrf::{CsrfConfig, CsrfError, FormRequest, TokenGuard, is_guarded_method};

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    method: String,
    content_type: Option<String>,
    body: Vec<u8>,
    /// Tokens minted before the request arrives
    issued: u8,
    limit: u8,
    /// Submit one of the issued tokens instead of whatever the body holds
    replay_issued: Option<u8>,
}

fuzz_target!(|data: FuzzRequest| {
    let limit = usize::from(data.limit.max(1));
    let mut session: Map<String, Value> = Map::new();
    let mut guard = match TokenGuard::with_config(&mut session, CsrfConfig::new().with_limit(limit)) {
        Ok(guard) => guard,
        Err(_) => return,
    };

    let issued: Vec<String> = (0..data.issued).map(|_| guard.generate_token()).collect();
    assert!(guard.tokens().len() <= limit);

    let request = match data.replay_issued {
        Some(idx) if !issued.is_empty() => {
            let token = &issued[usize::from(idx) % issued.len()];
            FormRequest::new(data.method.clone()).with_field("_csrf", token.as_str())
        }
        _ => match FormRequest::from_raw(data.method.clone(), data.content_type.as_deref(), &data.body) {
            Ok(request) => request,
            Err(e) => {
                assert_eq!(e.status_code(), 400);
                return;
            }
        },
    };

    let before = guard.tokens();
    let result = guard.process(&request, |_| ());
    let after = guard.tokens();

    match result {
        Ok(()) if is_guarded_method(&data.method) => assert!(after.len() < before.len()),
        Ok(()) => assert_eq!(after, before),
        Err(CsrfError::MissingToken) | Err(CsrfError::InvalidToken) => assert_eq!(after, before),
        Err(other) => panic!("unexpected error: {other}"),
    }
});
