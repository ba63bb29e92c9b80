use anchor_lang::prelude::*;

use crate::constants::{MAX_FACTORIES, MAX_SUB_VAULTS, MAX_VAULT_IMPLS};
use crate::error::KeeperError;

/// How a registered vault reports rewards
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub enum VaultKind {
    /// Runs its own validators; rewards come from the oracle Merkle tree
    #[default]
    Standard,
    /// Aggregates sub-vaults; proves its own reward, harvestable only once
    /// every sub-vault is harvested on the same round
    Meta,
}

/// Approved vault implementations and factories.
/// PDA: ["registry"]
#[account]
#[derive(Default, Debug, InitSpace)]
pub struct Registry {
    /// Can approve implementations, factories and vaults
    pub owner: Pubkey,

    /// Program ids allowed to own vault accounts
    #[max_len(MAX_VAULT_IMPLS)]
    pub vault_impls: Vec<Pubkey>,

    /// Signers allowed to register vaults besides the owner
    #[max_len(MAX_FACTORIES)]
    pub factories: Vec<Pubkey>,

    /// Number of vaults registered so far
    pub vaults_count: u64,

    /// PDA bump seed
    pub bump: u8,
}

fn insert_unique(list: &mut Vec<Pubkey>, key: Pubkey, max: usize) -> Result<()> {
    require_keys_neq!(key, Pubkey::default(), KeeperError::InvalidAddress);
    require!(!list.contains(&key), KeeperError::AlreadyAdded);
    require!(list.len() < max, KeeperError::RegistryFull);
    list.push(key);
    Ok(())
}

fn remove_existing(list: &mut Vec<Pubkey>, key: &Pubkey) -> Result<()> {
    let position = list
        .iter()
        .position(|k| k == key)
        .ok_or(KeeperError::NotFound)?;
    list.remove(position);
    Ok(())
}

impl Registry {
    pub fn add_vault_impl(&mut self, program_id: Pubkey) -> Result<()> {
        insert_unique(&mut self.vault_impls, program_id, MAX_VAULT_IMPLS)
    }

    pub fn remove_vault_impl(&mut self, program_id: &Pubkey) -> Result<()> {
        remove_existing(&mut self.vault_impls, program_id)
    }

    pub fn add_factory(&mut self, factory: Pubkey) -> Result<()> {
        insert_unique(&mut self.factories, factory, MAX_FACTORIES)
    }

    pub fn remove_factory(&mut self, factory: &Pubkey) -> Result<()> {
        remove_existing(&mut self.factories, factory)
    }

    pub fn is_vault_impl(&self, program_id: &Pubkey) -> bool {
        self.vault_impls.contains(program_id)
    }

    pub fn can_add_vaults(&self, caller: &Pubkey) -> bool {
        *caller == self.owner || self.factories.contains(caller)
    }

    /// Validates a new vault registration and bumps the counter
    pub fn register_vault(
        &mut self,
        caller: &Pubkey,
        vault_program: &Pubkey,
        kind: VaultKind,
        sub_vaults: &[Pubkey],
    ) -> Result<()> {
        require!(self.can_add_vaults(caller), KeeperError::Unauthorized);
        require!(self.is_vault_impl(vault_program), KeeperError::UnknownVaultImpl);
        VaultEntry::validate_sub_vaults(kind, sub_vaults)?;

        self.vaults_count = self
            .vaults_count
            .checked_add(1)
            .ok_or(KeeperError::MathOverflow)?;
        Ok(())
    }
}

/// Marks a vault as registered. Vaults are never removed.
/// PDA: ["vault_entry", vault]
#[account]
#[derive(Default, Debug, InitSpace)]
pub struct VaultEntry {
    pub vault: Pubkey,

    pub kind: VaultKind,

    /// Child vaults of a meta vault, in the order their reward records must
    /// be supplied when harvesting
    #[max_len(MAX_SUB_VAULTS)]
    pub sub_vaults: Vec<Pubkey>,

    pub bump: u8,
}

impl VaultEntry {
    pub fn validate_sub_vaults(kind: VaultKind, sub_vaults: &[Pubkey]) -> Result<()> {
        match kind {
            VaultKind::Standard => {
                require!(sub_vaults.is_empty(), KeeperError::InvalidSubVaults)
            }
            VaultKind::Meta => {
                require!(
                    !sub_vaults.is_empty() && sub_vaults.len() <= MAX_SUB_VAULTS,
                    KeeperError::InvalidSubVaults
                );
                for (i, sub_vault) in sub_vaults.iter().enumerate() {
                    require!(
                        !sub_vaults[..i].contains(sub_vault),
                        KeeperError::InvalidSubVaults
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(err: anchor_lang::error::Error) -> u32 {
        match err {
            anchor_lang::error::Error::AnchorError(e) => e.error_code_number,
            anchor_lang::error::Error::ProgramError(_) => u32::MAX,
        }
    }

    fn registry() -> (Registry, Pubkey, Pubkey) {
        let owner = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let mut registry = Registry {
            owner,
            ..Default::default()
        };
        registry.add_vault_impl(program).unwrap();
        (registry, owner, program)
    }

    #[test]
    fn owner_registers_vaults_of_approved_impls() {
        let (mut registry, owner, program) = registry();
        registry
            .register_vault(&owner, &program, VaultKind::Standard, &[])
            .unwrap();
        assert_eq!(registry.vaults_count, 1);

        let unknown = Pubkey::new_unique();
        assert_eq!(
            code(
                registry
                    .register_vault(&owner, &unknown, VaultKind::Standard, &[])
                    .unwrap_err()
            ),
            u32::from(KeeperError::UnknownVaultImpl)
        );
    }

    #[test]
    fn factories_register_until_removed() {
        let (mut registry, _, program) = registry();
        let factory = Pubkey::new_unique();

        assert_eq!(
            code(
                registry
                    .register_vault(&factory, &program, VaultKind::Standard, &[])
                    .unwrap_err()
            ),
            u32::from(KeeperError::Unauthorized)
        );

        registry.add_factory(factory).unwrap();
        registry
            .register_vault(&factory, &program, VaultKind::Standard, &[])
            .unwrap();

        registry.remove_factory(&factory).unwrap();
        assert!(!registry.can_add_vaults(&factory));
        assert_eq!(
            code(registry.remove_factory(&factory).unwrap_err()),
            u32::from(KeeperError::NotFound)
        );
    }

    #[test]
    fn duplicate_impls_are_rejected() {
        let (mut registry, _, program) = registry();
        assert_eq!(
            code(registry.add_vault_impl(program).unwrap_err()),
            u32::from(KeeperError::AlreadyAdded)
        );
        registry.remove_vault_impl(&program).unwrap();
        assert!(!registry.is_vault_impl(&program));
    }

    #[test]
    fn sub_vault_lists_match_the_kind() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        assert!(VaultEntry::validate_sub_vaults(VaultKind::Standard, &[]).is_ok());
        assert!(VaultEntry::validate_sub_vaults(VaultKind::Standard, &[a]).is_err());
        assert!(VaultEntry::validate_sub_vaults(VaultKind::Meta, &[]).is_err());
        assert!(VaultEntry::validate_sub_vaults(VaultKind::Meta, &[a, b]).is_ok());
        assert!(VaultEntry::validate_sub_vaults(VaultKind::Meta, &[a, b, a]).is_err());
    }
}
