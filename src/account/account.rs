use crate::account::address::{to_verifying_key, verifying_key_to_address};
use crate::account::keys::{seed_to_signing_key, signing_to_verifying_key};
use crate::core::types::{BlockHash, Seed, Signature, SigningKey, VerifyingKey};
use crate::error::{LedgerError, Result};
use crate::utils::{ed25519_blake2b_sign, ed25519_blake2b_verify};

/// One account identity: an optional signing key and the verifying key it
/// (or the caller) vouches for.
///
/// Every supplied form is normalised and cross-checked on construction, so
/// an `Account` always holds a verifying key and never holds a signing key
/// for a different one.
#[derive(Debug, Clone)]
pub struct Account {
    signing_key: Option<SigningKey>,
    verifying_key: VerifyingKey,
}

impl Account {
    /// `address` may be an `xrb_` address or a hex verifying key.
    pub fn new(
        signing_key: Option<SigningKey>,
        verifying_key: Option<VerifyingKey>,
        address: Option<&str>,
    ) -> Result<Account> {
        let address_key = address.map(to_verifying_key).transpose()?;
        let derived_key = signing_key.as_ref().map(signing_to_verifying_key);

        let mut agreed: Option<(&str, VerifyingKey)> = None;
        for (source, candidate) in [
            ("signing key", derived_key),
            ("verifying key", verifying_key),
            ("address", address_key),
        ] {
            let Some(candidate) = candidate else {
                continue;
            };
            match agreed {
                Some((first_source, first)) if first != candidate => {
                    return Err(LedgerError::Mismatch(format!(
                        "{source} does not match {first_source}"
                    )));
                }
                Some(_) => {}
                None => agreed = Some((source, candidate)),
            }
        }

        let (_, verifying_key) = agreed.ok_or_else(|| {
            LedgerError::State(
                "An account needs a signing key, a verifying key or an address".to_string(),
            )
        })?;

        Ok(Account {
            signing_key,
            verifying_key,
        })
    }

    pub fn from_signing_key(signing_key: SigningKey) -> Account {
        let verifying_key = signing_to_verifying_key(&signing_key);
        Account {
            signing_key: Some(signing_key),
            verifying_key,
        }
    }

    pub fn from_seed(seed: &Seed, index: u32) -> Account {
        Self::from_signing_key(seed_to_signing_key(seed, index))
    }

    pub fn from_verifying_key(verifying_key: VerifyingKey) -> Account {
        Account {
            signing_key: None,
            verifying_key,
        }
    }

    pub fn from_address(address: &str) -> Result<Account> {
        Self::new(None, None, Some(address))
    }

    pub fn signing_key(&self) -> Option<&SigningKey> {
        self.signing_key.as_ref()
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    pub fn address(&self) -> String {
        verifying_key_to_address(&self.verifying_key)
    }

    pub fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }

    pub fn sign_block(&self, hash: &BlockHash) -> Result<Signature> {
        let signing_key = self.signing_key.as_ref().ok_or_else(|| {
            LedgerError::State("Signing requires an account with a signing key".to_string())
        })?;
        Ok(ed25519_blake2b_sign(signing_key, hash.as_bytes()))
    }

    /// Forged or corrupted signatures are expected input: this never errors.
    pub fn signature_valid(&self, hash: &BlockHash, signature: &Signature) -> bool {
        ed25519_blake2b_verify(&self.verifying_key, hash.as_bytes(), signature)
    }
}
