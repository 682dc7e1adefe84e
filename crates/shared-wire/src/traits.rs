//! # Encoding Traits
//!
//! `Polorize` and `Depolorize` are the seams through which domain types
//! describe their canonical wire layout. Sequences are packs, `Option::None`
//! is null, strings are words.

use crate::depolorizer::Depolorizer;
use crate::errors::WireError;
use crate::polorizer::Polorizer;

/// Types with a canonical wire encoding.
pub trait Polorize {
    /// Writes `self` as exactly one element.
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError>;
}

/// Types that can be read back from their canonical wire encoding.
pub trait Depolorize: Sized {
    /// Reads exactly one element.
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError>;
}

impl Polorize for bool {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_bool(*self);
        Ok(())
    }
}

impl Depolorize for bool {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        depolorizer.read_bool()
    }
}

impl Polorize for u64 {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_u64(*self);
        Ok(())
    }
}

impl Depolorize for u64 {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        depolorizer.read_u64()
    }
}

impl Polorize for u32 {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_u64(u64::from(*self));
        Ok(())
    }
}

impl Depolorize for u32 {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let value = depolorizer.read_u64()?;
        u32::try_from(value).map_err(|_| WireError::IntegerOverflow("u32"))
    }
}

impl Polorize for i64 {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_i64(*self);
        Ok(())
    }
}

impl Depolorize for i64 {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        depolorizer.read_i64()
    }
}

impl Polorize for f64 {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_f64(*self);
        Ok(())
    }
}

impl Depolorize for f64 {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        depolorizer.read_f64()
    }
}

impl Polorize for str {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_str(self);
        Ok(())
    }
}

impl Polorize for String {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_str(self);
        Ok(())
    }
}

impl Depolorize for String {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        depolorizer.read_string()
    }
}

impl<T: Polorize> Polorize for Vec<T> {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut inner = Polorizer::new();
        for item in self {
            item.polorize(&mut inner)?;
        }
        polorizer.write_pack(inner);
        Ok(())
    }
}

impl<T: Depolorize> Depolorize for Vec<T> {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let mut pack = depolorizer.read_packed()?;
        let mut items = Vec::with_capacity(pack.remaining());
        while !pack.is_done() {
            items.push(T::depolorize(&mut pack)?);
        }
        Ok(items)
    }
}

impl<T: Polorize> Polorize for Option<T> {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        match self {
            Some(value) => value.polorize(polorizer),
            None => {
                polorizer.write_null();
                Ok(())
            }
        }
    }
}

impl<T: Depolorize> Depolorize for Option<T> {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        if depolorizer.peek_wire() == Some(crate::WireType::Null) {
            depolorizer.read_null()?;
            return Ok(None);
        }
        T::depolorize(depolorizer).map(Some)
    }
}

impl<T: Polorize + ?Sized> Polorize for &T {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        (**self).polorize(polorizer)
    }
}
