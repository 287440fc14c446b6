//! Renders the signed records as Aiken expressions, the format the on-chain
//! validator's tests are written in.
//!
//! ```
//! use konduit::{aiken::Aiken, squash::SquashBody};
//!
//! let body = SquashBody::new(300, 4, vec![2, 3]);
//! assert_eq!(Aiken(&body).to_string(), "(300, 4, [2, 3])");
//! ```

use core::fmt::{self, Display, Formatter};

use crate::{
    cheque::{Cheque, ChequeBody, Unlocked},
    squash::{Squash, SquashBody},
};

/// Types with an Aiken literal.
pub trait AsAiken {
    fn fmt_aiken(&self, f: &mut Formatter<'_>) -> fmt::Result;
}

/// [Display] adapter writing the Aiken literal of the wrapped value.
pub struct Aiken<'a, T: ?Sized>(pub &'a T);

impl<T: AsAiken + ?Sized> Display for Aiken<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt_aiken(f)
    }
}

struct ByteArray<'a>(&'a [u8]);

impl Display for ByteArray<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("#\"")?;
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        f.write_str("\"")
    }
}

impl AsAiken for ChequeBody {
    fn fmt_aiken(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.index,
            self.amount,
            self.timeout,
            ByteArray(&self.lock.0)
        )
    }
}

impl AsAiken for Cheque {
    fn fmt_aiken(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            Aiken(&self.body),
            ByteArray(&self.signature.0)
        )
    }
}

impl AsAiken for Unlocked {
    fn fmt_aiken(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            Aiken(self.body()),
            ByteArray(&self.signature().0),
            ByteArray(self.secret())
        )
    }
}

impl AsAiken for SquashBody {
    fn fmt_aiken(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, [", self.amount, self.index)?;
        for (i, index) in self.exclude.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", index)?;
        }
        f.write_str("])")
    }
}

impl AsAiken for Squash {
    fn fmt_aiken(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            Aiken(&self.body),
            ByteArray(&self.signature.0)
        )
    }
}
