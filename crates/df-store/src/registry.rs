use df_api_types::{ContractInstance, ContractInstanceId, WalletId};
use std::collections::HashMap;

/// Wallet → contract instance lookup, built once from the backend's
/// instance list.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    instances: HashMap<WalletId, ContractInstanceId>,
}

impl ContractRegistry {
    /// Builds the registry together with the wallet sequence in backend order.
    /// Duplicated wallets stay duplicated in the sequence; the later instance
    /// wins in the registry.
    pub fn from_instances(instances: &[ContractInstance]) -> (Self, Vec<WalletId>) {
        let mut registry = Self::default();
        let mut wallets = Vec::with_capacity(instances.len());
        for instance in instances {
            registry.register(instance);
            wallets.push(instance.wallet_id.clone());
        }
        (registry, wallets)
    }

    pub fn register(&mut self, instance: &ContractInstance) {
        self.instances
            .insert(instance.wallet_id.clone(), instance.instance_id.clone());
    }

    pub fn instance(&self, wallet: &WalletId) -> Option<&ContractInstanceId> {
        self.instances.get(wallet)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(wallet: &str, id: &str) -> ContractInstance {
        ContractInstance {
            wallet_id: WalletId(wallet.to_owned()),
            instance_id: ContractInstanceId(id.to_owned()),
        }
    }

    #[test]
    fn wallets_follow_backend_order() {
        let (registry, wallets) =
            ContractRegistry::from_instances(&[instance("w2", "i2"), instance("w1", "i1")]);

        assert_eq!(wallets, vec![WalletId("w2".to_owned()), WalletId("w1".to_owned())]);
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.instance(&WalletId("w1".to_owned())),
            Some(&ContractInstanceId("i1".to_owned()))
        );
        assert_eq!(registry.instance(&WalletId("w3".to_owned())), None);
    }

    #[test]
    fn duplicate_wallet_keeps_later_instance() {
        let (registry, wallets) = ContractRegistry::from_instances(&[
            instance("w1", "old"),
            instance("w2", "i2"),
            instance("w1", "new"),
        ]);

        assert_eq!(wallets.len(), 3);
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.instance(&WalletId("w1".to_owned())),
            Some(&ContractInstanceId("new".to_owned()))
        );
    }

    #[test]
    fn empty_list_builds_empty_registry() {
        let (registry, wallets) = ContractRegistry::from_instances(&[]);
        assert!(registry.is_empty());
        assert!(wallets.is_empty());
    }
}
