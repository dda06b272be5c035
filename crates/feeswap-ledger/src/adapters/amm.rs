use dashmap::DashMap;
use feeswap_core::{Address, TokenAmount};
use std::sync::Arc;

use crate::error::RouterError;
use crate::traits::{IEnvironment, IRouter, IToken, SwapRequest};

/// Pool fee numerator (0.30% fee: 997/1000 of the input is priced).
const POOL_FEE_NUMERATOR: u128 = 997;
const POOL_FEE_DENOMINATOR: u128 = 1_000;

/// Constant-product (x·y = k) AMM router.
///
/// Each pool is a vault account on the token collaborator; reserves are
/// simply the vault's balances, so the environment's checkpoints cover
/// pool state too.
pub struct ConstantProductRouter {
    address: Address,
    token: Arc<dyn IToken>,
    env: Arc<dyn IEnvironment>,
    /// Ordered token pair -> vault account.
    pools: DashMap<(Address, Address), Address>,
}

impl ConstantProductRouter {
    pub fn new(address: Address, token: Arc<dyn IToken>, env: Arc<dyn IEnvironment>) -> Self {
        Self {
            address,
            token,
            env,
            pools: DashMap::new(),
        }
    }

    fn pair_key(a: &Address, b: &Address) -> (Address, Address) {
        if a <= b {
            (*a, *b)
        } else {
            (*b, *a)
        }
    }

    /// Register a pool for the pair and return its vault account. Fund the
    /// vault through the token collaborator to provide liquidity.
    pub fn create_pool(&self, a: &Address, b: &Address) -> Address {
        let key = Self::pair_key(a, b);
        let router = self.address;
        *self
            .pools
            .entry(key)
            .or_insert_with(|| {
                let mut hasher = blake3::Hasher::new();
                hasher.update(b"feeswap.pool");
                hasher.update(router.as_bytes());
                hasher.update(key.0.as_bytes());
                hasher.update(key.1.as_bytes());
                let digest = hasher.finalize();
                let mut bytes = [0u8; 20];
                bytes.copy_from_slice(&digest.as_bytes()[..20]);
                let vault = Address::new(bytes);
                tracing::info!(token_a = %key.0, token_b = %key.1, %vault, "pool created");
                vault
            })
            .value()
    }

    /// Vault account for the pair, if a pool exists.
    pub fn pool_vault(&self, a: &Address, b: &Address) -> Option<Address> {
        self.pools.get(&Self::pair_key(a, b)).map(|v| *v)
    }

    /// Current reserves of the pair as `(reserve_a, reserve_b)`.
    pub fn reserves(&self, a: &Address, b: &Address) -> Option<(TokenAmount, TokenAmount)> {
        let vault = self.pool_vault(a, b)?;
        Some((self.token.balance_of(a, &vault), self.token.balance_of(b, &vault)))
    }

    /// Output of a single hop given reserves.
    pub fn amount_out(
        amount_in: TokenAmount,
        reserve_in: TokenAmount,
        reserve_out: TokenAmount,
    ) -> Option<TokenAmount> {
        if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
            return None;
        }
        let in_with_fee = amount_in.checked_mul(POOL_FEE_NUMERATOR)?;
        let numerator = in_with_fee.checked_mul(reserve_out)?;
        let denominator = reserve_in
            .checked_mul(POOL_FEE_DENOMINATOR)?
            .checked_add(in_with_fee)?;
        Some(numerator / denominator)
    }

    fn hop(&self, amount_in: TokenAmount, from: &Address, to: &Address) -> Result<TokenAmount, RouterError> {
        let vault = self
            .pool_vault(from, to)
            .ok_or(RouterError::NoPool(*from, *to))?;
        let reserve_in = self.token.balance_of(from, &vault);
        let reserve_out = self.token.balance_of(to, &vault);
        Self::amount_out(amount_in, reserve_in, reserve_out).ok_or_else(|| {
            RouterError::Reverted(format!("insufficient liquidity for {} -> {}", from, to))
        })
    }
}

impl IRouter for ConstantProductRouter {
    fn address(&self) -> Address {
        self.address
    }

    fn get_amounts_out(
        &self,
        amount_in: TokenAmount,
        path: &[Address],
    ) -> Result<Vec<TokenAmount>, RouterError> {
        if path.len() < 2 {
            return Err(RouterError::Reverted("path too short".into()));
        }
        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        for pair in path.windows(2) {
            let current = amounts[amounts.len() - 1];
            let out = self.hop(current, &pair[0], &pair[1])?;
            amounts.push(out);
        }
        Ok(amounts)
    }

    fn swap_exact_in(&self, request: &SwapRequest) -> Result<Vec<TokenAmount>, RouterError> {
        let now = self.env.timestamp();
        if request.deadline != 0 && now > request.deadline {
            return Err(RouterError::Expired {
                deadline: request.deadline,
                now,
            });
        }

        let amounts = self.get_amounts_out(request.amount_in, &request.path)?;
        let final_out = amounts[amounts.len() - 1];
        if final_out < request.amount_out_min {
            return Err(RouterError::InsufficientOutput {
                got: final_out,
                min: request.amount_out_min,
            });
        }

        let path = &request.path;
        let vaults = path
            .windows(2)
            .map(|pair| self.pool_vault(&pair[0], &pair[1]).ok_or(RouterError::NoPool(pair[0], pair[1])))
            .collect::<Result<Vec<_>, _>>()?;

        if !self.token.transfer_from(
            &path[0],
            &self.address,
            &request.sender,
            &vaults[0],
            request.amount_in,
        ) {
            return Err(RouterError::Reverted("input transfer failed".into()));
        }

        for (i, vault) in vaults.iter().enumerate() {
            let destination = vaults.get(i + 1).copied().unwrap_or(request.recipient);
            if !self.token.transfer(&path[i + 1], vault, &destination, amounts[i + 1]) {
                return Err(RouterError::Reverted(format!("hop {} payout failed", i)));
            }
        }

        tracing::debug!(
            router = %self.address,
            amount_in = request.amount_in,
            amount_out = final_out,
            hops = vaults.len(),
            "amm swap executed"
        );
        Ok(amounts)
    }
}
