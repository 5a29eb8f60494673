// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payload signing with HMAC-SHA256 keyed by the API secret.

use hmac::{Hmac, Mac};
use logtrail_config::SecretString;
use logtrail_core::{Payload, UnsignedPayload};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `input`.
pub fn compute_signature(secret: &[u8], input: &[u8]) -> String {
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
	mac.update(input);
	hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex-encoded signature.
pub fn verify_signature(secret: &[u8], input: &[u8], signature: &str) -> bool {
	let Ok(expected) = hex::decode(signature) else {
		return false;
	};
	let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
		return false;
	};
	mac.update(input);
	mac.verify_slice(&expected).is_ok()
}

/// Signs payloads with the configured API secret.
#[derive(Debug, Clone)]
pub struct Signer {
	secret: SecretString,
}

impl Signer {
	pub fn new(secret: SecretString) -> Self {
		Self { secret }
	}

	/// Seal `payload`. Nothing covered by the signature changes afterwards.
	pub fn sign(&self, payload: UnsignedPayload) -> Payload {
		let signature = compute_signature(
			self.secret.expose().as_bytes(),
			payload.signing_input().as_bytes(),
		);
		payload.into_signed(signature)
	}

	pub fn verify(&self, payload: &Payload) -> bool {
		verify_signature(
			self.secret.expose().as_bytes(),
			payload.signing_input().as_bytes(),
			payload.signature(),
		)
	}
}
