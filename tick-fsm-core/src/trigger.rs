//! Trigger codes.
//!
//! A trigger is a non-zero integer event code. Code `0` means "no trigger, stay in the
//! current state" and is therefore not representable as a [`Trigger`]; a state's loop hook
//! returns `Option<Trigger>` instead.

use core::fmt;
use core::num::NonZeroI32;

/// A non-zero event code that may cause a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Trigger(NonZeroI32);

impl Trigger {
    /// Wraps `code`, returning `None` for the reserved code `0`.
    #[must_use]
    pub const fn new(code: i32) -> Option<Self> {
        match NonZeroI32::new(code) {
            Some(code) => Some(Self(code)),
            None => None,
        }
    }

    /// Wraps `code` in a `const` context.
    ///
    /// # Panics
    ///
    /// Panics if `code` is `0`. In a `const` item this is a compile error.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match NonZeroI32::new(code) {
            Some(code) => Self(code),
            None => panic!("trigger code 0 is reserved for \"no trigger\""),
        }
    }

    /// The raw integer code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0.get()
    }
}

impl From<NonZeroI32> for Trigger {
    fn from(code: NonZeroI32) -> Self {
        Self(code)
    }
}

impl From<Trigger> for i32 {
    fn from(trigger: Trigger) -> Self {
        trigger.code()
    }
}

impl TryFrom<i32> for Trigger {
    type Error = crate::FsmError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::new(code).ok_or(crate::FsmError::ReservedTrigger)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Declares a trigger enum whose variants convert into [`Trigger`].
///
/// Every discriminant must be non-zero; a zero discriminant fails to compile.
///
/// ```rust
/// use tick_fsm_core::{Trigger, triggers};
///
/// triggers! {
///     pub enum Button {
///         Open = 2,
///         Close = 3,
///     }
/// }
///
/// assert_eq!(Trigger::from(Button::Close).code(), 3);
/// assert_eq!(Button::try_from(Trigger::from_code(2)), Ok(Button::Open));
/// ```
#[macro_export]
macro_rules! triggers {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vattr:meta])* $variant:ident = $code:expr),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $name {
            $($(#[$vattr])* $variant = $code),+
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The trigger this variant fires.
            #[must_use]
            pub const fn trigger(self) -> $crate::Trigger {
                $crate::Trigger::from_code(self as i32)
            }
        }

        const _: () = {
            $(let _ = $crate::Trigger::from_code($code);)+
        };

        impl ::core::convert::From<$name> for $crate::Trigger {
            fn from(value: $name) -> Self {
                value.trigger()
            }
        }

        impl ::core::convert::TryFrom<$crate::Trigger> for $name {
            type Error = $crate::Trigger;

            fn try_from(trigger: $crate::Trigger) -> ::core::result::Result<Self, Self::Error> {
                $(
                    if trigger.code() == $name::$variant as i32 {
                        return ::core::result::Result::Ok($name::$variant);
                    }
                )+
                ::core::result::Result::Err(trigger)
            }
        }
    };
}
