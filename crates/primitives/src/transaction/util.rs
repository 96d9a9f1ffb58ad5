//! Thin wrappers around the secp256k1 backend.

use crate::{keccak256, Address, Signature, B256, U256};
pub(crate) use secp256k1::Error;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, SecretKey, SECP256K1,
};

/// Recovers the address of the sender using secp256k1 pubkey recovery.
///
/// Converts the public key into an ethereum address by hashing the public key
/// with keccak256.
///
/// This does not ensure that the `s` value in the signature is low, it _just_
/// wraps the underlying curve operation.
pub(crate) fn recover_signer_unchecked(
    sig: &[u8; 65],
    msg: &[u8; 32],
) -> Result<Address, Error> {
    let sig =
        RecoverableSignature::from_compact(&sig[0..64], RecoveryId::from_i32(sig[64] as i32)?)?;

    let public = SECP256K1.recover_ecdsa(&Message::from_digest(*msg), &sig)?;
    Ok(public_key_to_address(public))
}

/// Signs the given 32-byte digest with the secret key, producing a low-s
/// recoverable signature.
pub fn sign_message(secret: B256, message: B256) -> Result<Signature, Error> {
    let sec = SecretKey::from_slice(secret.as_ref())?;
    let s = SECP256K1.sign_ecdsa_recoverable(&Message::from_digest(message.0), &sec);
    let (rec_id, data) = s.serialize_compact();

    let signature = Signature {
        r: U256::try_from_be_slice(&data[..32]).expect("The slice has at most 32 bytes"),
        s: U256::try_from_be_slice(&data[32..64]).expect("The slice has at most 32 bytes"),
        odd_y_parity: rec_id.to_i32() != 0,
    };
    Ok(signature)
}

/// Converts a public key into an ethereum address by hashing the encoded
/// public key with keccak256.
pub fn public_key_to_address(public: PublicKey) -> Address {
    // strip out the first byte because that should be the
    // SECP256K1_TAG_PUBKEY_UNCOMPRESSED tag returned by libsecp's uncompressed
    // pubkey serialization
    let hash = keccak256(&public.serialize_uncompressed()[1..]);
    Address::from_slice(&hash[12..])
}
