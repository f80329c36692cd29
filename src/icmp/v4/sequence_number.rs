use super::Ttl;

type SequenceNumberInnerType = u16;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct SequenceNumber(pub SequenceNumberInnerType);

// Each probe is tagged with its TTL so replies can be matched to hops.
impl From<Ttl> for SequenceNumber {
    fn from(ttl: Ttl) -> Self {
        SequenceNumber(SequenceNumberInnerType::from(ttl.0))
    }
}

impl From<SequenceNumber> for SequenceNumberInnerType {
    fn from(value: SequenceNumber) -> Self {
        value.0
    }
}

impl From<SequenceNumberInnerType> for SequenceNumber {
    fn from(value: SequenceNumberInnerType) -> Self {
        SequenceNumber(value)
    }
}

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ttl() {
        assert_eq!(SequenceNumber(12), SequenceNumber::from(Ttl(12)));
        assert_eq!(SequenceNumber(255), SequenceNumber::from(Ttl(u8::MAX)));
    }
}
