//! Account roles.
//!
//! A role sits on two independent axes, signer-ness and writable-ness, so
//! the four roles form a lattice. Merging two roles yields their least
//! upper bound, which makes folding any number of references to the same
//! address order-independent.

const IS_SIGNER_BITMASK: u8 = 0b10;
const IS_WRITABLE_BITMASK: u8 = 0b01;

/// The privileges an instruction requests for an account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccountRole {
    #[default]
    Readonly = 0b00,
    Writable = 0b01,
    ReadonlySigner = 0b10,
    WritableSigner = 0b11,
}

impl AccountRole {
    pub const ALL: [AccountRole; 4] = [
        AccountRole::Readonly,
        AccountRole::Writable,
        AccountRole::ReadonlySigner,
        AccountRole::WritableSigner,
    ];

    const fn from_bits(bits: u8) -> Self {
        match bits & (IS_SIGNER_BITMASK | IS_WRITABLE_BITMASK) {
            0b00 => AccountRole::Readonly,
            0b01 => AccountRole::Writable,
            0b10 => AccountRole::ReadonlySigner,
            _ => AccountRole::WritableSigner,
        }
    }

    /// Build a role from the `is_signer` and `is_writable` flags.
    pub const fn from_flags(is_signer: bool, is_writable: bool) -> Self {
        let mut bits = 0;
        if is_signer {
            bits |= IS_SIGNER_BITMASK;
        }
        if is_writable {
            bits |= IS_WRITABLE_BITMASK;
        }
        Self::from_bits(bits)
    }

    pub const fn is_signer(self) -> bool {
        self as u8 & IS_SIGNER_BITMASK != 0
    }

    pub const fn is_writable(self) -> bool {
        self as u8 & IS_WRITABLE_BITMASK != 0
    }

    /// The least upper bound of two roles: writable if either is writable,
    /// a signer if either is a signer.
    pub const fn merge(self, other: Self) -> Self {
        Self::from_bits(self as u8 | other as u8)
    }

    pub const fn upgrade_to_signer(self) -> Self {
        Self::from_bits(self as u8 | IS_SIGNER_BITMASK)
    }

    pub const fn upgrade_to_writable(self) -> Self {
        Self::from_bits(self as u8 | IS_WRITABLE_BITMASK)
    }

    pub const fn downgrade_to_non_signer(self) -> Self {
        Self::from_bits(self as u8 & !IS_SIGNER_BITMASK)
    }

    pub const fn downgrade_to_readonly(self) -> Self {
        Self::from_bits(self as u8 & !IS_WRITABLE_BITMASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        for role in AccountRole::ALL {
            assert_eq!(
                AccountRole::from_flags(role.is_signer(), role.is_writable()),
                role
            );
        }
        assert!(AccountRole::WritableSigner.is_signer());
        assert!(AccountRole::WritableSigner.is_writable());
        assert!(AccountRole::ReadonlySigner.is_signer());
        assert!(!AccountRole::ReadonlySigner.is_writable());
        assert!(!AccountRole::Writable.is_signer());
        assert!(AccountRole::Writable.is_writable());
        assert!(!AccountRole::Readonly.is_signer());
        assert!(!AccountRole::Readonly.is_writable());
    }

    #[test]
    fn test_merge_is_commutative_and_idempotent() {
        for a in AccountRole::ALL {
            assert_eq!(a.merge(a), a);
            for b in AccountRole::ALL {
                assert_eq!(a.merge(b), b.merge(a));
                for c in AccountRole::ALL {
                    assert_eq!(a.merge(b).merge(c), a.merge(b.merge(c)));
                }
            }
        }
    }

    #[test]
    fn test_merge_is_least_upper_bound() {
        assert_eq!(
            AccountRole::Writable.merge(AccountRole::ReadonlySigner),
            AccountRole::WritableSigner
        );
        assert_eq!(
            AccountRole::Readonly.merge(AccountRole::Writable),
            AccountRole::Writable
        );
        assert_eq!(
            AccountRole::Readonly.merge(AccountRole::ReadonlySigner),
            AccountRole::ReadonlySigner
        );
        for role in AccountRole::ALL {
            assert_eq!(role.merge(AccountRole::Readonly), role);
            assert_eq!(
                role.merge(AccountRole::WritableSigner),
                AccountRole::WritableSigner
            );
        }
    }

    #[test]
    fn test_upgrade_and_downgrade() {
        assert_eq!(
            AccountRole::Readonly.upgrade_to_signer(),
            AccountRole::ReadonlySigner
        );
        assert_eq!(
            AccountRole::Writable.upgrade_to_signer(),
            AccountRole::WritableSigner
        );
        assert_eq!(
            AccountRole::ReadonlySigner.upgrade_to_writable(),
            AccountRole::WritableSigner
        );
        assert_eq!(
            AccountRole::WritableSigner.downgrade_to_non_signer(),
            AccountRole::Writable
        );
        assert_eq!(
            AccountRole::WritableSigner.downgrade_to_readonly(),
            AccountRole::ReadonlySigner
        );
        assert_eq!(
            AccountRole::Writable.downgrade_to_readonly(),
            AccountRole::Readonly
        );
    }
}
