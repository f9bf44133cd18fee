use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::ops::BitAnd;
use std::ops::BitOr;

/// bitset of optional handler features a guest can ask the host for
///
/// the host answers an enable request with the features that are actually on, which is not
/// necessarily what was asked for, so a guest must only ever trust the returned set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(u64);

const NAMES: [(Features, &str); 3] = [
    (Features::BUFFER_REQUEST, "buffer_request"),
    (Features::BUFFER_RESPONSE, "buffer_response"),
    (Features::TRAILERS, "trailers"),
];

impl Features {
    /// the request body can be read more than once
    pub const BUFFER_REQUEST: Features = Features(1 << 0);
    /// the response body is buffered so it can be read or rewritten after the next handler
    pub const BUFFER_RESPONSE: Features = Features(1 << 1);
    /// http trailers are readable and writable
    pub const TRAILERS: Features = Features(1 << 2);

    pub const fn empty() -> Self {
        Features(0)
    }

    pub const fn from_bits(bits: u64) -> Self {
        Features(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_subset_of(&self, other: Features) -> bool {
        other.contains(*self)
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

impl BitAnd for Features {
    type Output = Features;

    fn bitand(self, rhs: Features) -> Features {
        Features(self.0 & rhs.0)
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut known = Features::empty();
        let mut first = true;
        for (feature, name) in NAMES {
            if self.contains(feature) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                known = known | feature;
                first = false;
            }
        }
        let unknown = self.0 & !known.0;
        if unknown != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{:#x}", unknown)?;
        }
        Ok(())
    }
}
