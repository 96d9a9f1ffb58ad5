/// Errors emitted while decoding RLP data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The input ended before the declared payload did.
    #[error("input too short")]
    InputTooShort,
    /// A numeric scalar does not fit the target integer type.
    #[error("scalar overflows the target type")]
    Overflow,
    /// A scalar carried leading zero octets.
    #[error("scalar has leading zero bytes")]
    LeadingZero,
    /// A single byte below 0x80 was wrapped in a string header.
    #[error("single byte should have been encoded literally")]
    NonCanonicalSingleByte,
    /// A long-form length was used where the short form would have fit.
    #[error("length of length is non-minimal")]
    NonCanonicalSize,
    /// Expected a string but the header declared a list.
    #[error("unexpected list")]
    UnexpectedList,
    /// Expected a list but the header declared a string.
    #[error("unexpected string")]
    UnexpectedString,
    /// A fixed-size item had a different payload length than required.
    #[error("unexpected string length")]
    UnexpectedLength,
    /// Decoder-specific error with a static message.
    #[error("{0}")]
    Custom(&'static str),
}
