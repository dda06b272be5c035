use feeswap_core::Address;

use crate::traits::IAuthority;

/// Authority that accepts exactly one owner address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleOwner {
    owner: Address,
}

impl SingleOwner {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }
}

impl IAuthority for SingleOwner {
    fn is_authorized(&self, caller: &Address) -> bool {
        !caller.is_zero() && *caller == self.owner
    }
}
