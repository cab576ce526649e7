//! Signed, sealed share invitations.
//!
//! An invitation transfers one capability cell handle from sender to
//! recipient over the untrusted store. The handle is sealed to the
//! recipient's exchange key so only they can read it, and the sealed box
//! is signed by the sender so the recipient can reject tokens planted or
//! altered by the server. Verification happens before decryption; a bad
//! signature is reported as forgery, a box that fails to open as
//! tampering.

use serde::{Deserialize, Serialize};

use veilstore_core::{
    ExchangePublicKey, ExchangeSecret, SealedBox, Signature, SigningKeypair, VerifyingKey,
};

use crate::error::{ClientError, Result};
use crate::record::CellHandle;

const INVITATION_CONTEXT: &[u8] = b"veilstore v1 invitation";

/// A cell handle in transit between two users.
#[derive(Clone, Serialize, Deserialize)]
pub struct SealedInvitation {
    sealed: SealedBox,
    signature: Signature,
}

impl SealedInvitation {
    /// Seal `handle` for `recipient` and sign it as `sender`.
    pub fn seal(
        handle: &CellHandle,
        recipient: &ExchangePublicKey,
        sender: &SigningKeypair,
    ) -> Result<Self> {
        let mut payload = Vec::new();
        ciborium::into_writer(handle, &mut payload).expect("CBOR serialization failed");

        let sealed = SealedBox::seal(recipient, &payload, INVITATION_CONTEXT)?;
        let signature = sender.sign(&signable(&sealed));
        Ok(Self { sealed, signature })
    }

    /// Verify the sender's signature, then open the box.
    pub fn open(
        &self,
        recipient: &ExchangeSecret,
        sender: &VerifyingKey,
    ) -> Result<CellHandle> {
        sender
            .verify(&signable(&self.sealed), &self.signature)
            .map_err(|_| ClientError::Forged)?;

        let payload = self
            .sealed
            .open(recipient, INVITATION_CONTEXT)
            .map_err(|_| ClientError::Integrity)?;
        ciborium::from_reader(payload.as_slice())
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    /// Encode for placement in the store.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Decode a token fetched from the store.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| ClientError::Malformed(e.to_string()))
    }
}

impl std::fmt::Debug for SealedInvitation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedInvitation")
            .field("sealed", &self.sealed)
            .finish_non_exhaustive()
    }
}

fn signable(sealed: &SealedBox) -> Vec<u8> {
    let mut buf = Vec::new();
    ciborium::into_writer(sealed, &mut buf).expect("CBOR serialization failed");
    buf
}
