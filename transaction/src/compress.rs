//! Rewrite static account references as lookup table references.

use {
    crate::message::TransactionMessage,
    log::debug,
    solana_pubkey::Pubkey,
    std::collections::{HashMap, HashSet},
    txforge_error::CompileError,
    txforge_keys::{compare_addresses, AccountLookupMeta, AccountReference},
};

/// Replace every static, non-signer account reference whose address appears
/// in one of the given lookup tables with a reference into that table.
///
/// Tables are searched in collation order and the first index found wins.
/// Signers, invoked programs and existing lookup references are left alone.
pub fn compress_with_lookup_tables(
    message: &TransactionMessage,
    addresses_by_lookup_table: &HashMap<Pubkey, Vec<Pubkey>>,
) -> Result<TransactionMessage, CompileError> {
    if message.version.is_legacy() {
        return Err(CompileError::AddressTableLookupsInLegacyMessage);
    }

    let mut tables = addresses_by_lookup_table.iter().collect::<Vec<_>>();
    tables.sort_by(|(a, _), (b, _)| compare_addresses(a, b));
    let mut lookups = HashMap::<Pubkey, (Pubkey, u8)>::new();
    for (lookup_table_address, addresses) in tables {
        for (index, address) in addresses.iter().enumerate().take(usize::from(u8::MAX) + 1) {
            lookups
                .entry(*address)
                .or_insert((*lookup_table_address, index as u8));
        }
    }

    let program_ids = message
        .instructions
        .iter()
        .map(|instruction| instruction.program_id)
        .collect::<HashSet<_>>();

    let mut compressed = 0usize;
    let mut result = message.clone();
    for account in result
        .instructions
        .iter_mut()
        .flat_map(|instruction| instruction.accounts.iter_mut())
    {
        let AccountReference::Static(meta) = *account else {
            continue;
        };
        if meta.role.is_signer() || program_ids.contains(&meta.pubkey) {
            continue;
        }
        if let Some((lookup_table_address, address_index)) = lookups.get(&meta.pubkey).copied() {
            *account = if meta.role.is_writable() {
                AccountLookupMeta::new(meta.pubkey, lookup_table_address, address_index)
            } else {
                AccountLookupMeta::new_readonly(meta.pubkey, lookup_table_address, address_index)
            }
            .into();
            compressed += 1;
        }
    }
    debug!("Compressed {compressed} account references into lookup tables");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::message::TransactionVersion,
        txforge_keys::{AccountMeta, Instruction},
    };

    #[test]
    fn test_compress() {
        let program_id = Pubkey::new_unique();
        let signer = Pubkey::new_unique();
        let writable = Pubkey::new_unique();
        let readonly = Pubkey::new_unique();
        let absent = Pubkey::new_unique();
        let table = Pubkey::new_unique();

        let message = TransactionMessage::default().append_instruction(Instruction::new(
            program_id,
            vec![
                AccountMeta::new_readonly(signer, true).into(),
                AccountMeta::new(writable, false).into(),
                AccountMeta::new_readonly(readonly, false).into(),
                AccountMeta::new_readonly(absent, false).into(),
                AccountMeta::new_readonly(program_id, false).into(),
            ],
            vec![],
        ));
        let tables = HashMap::from([(table, vec![signer, readonly, writable, program_id])]);

        let compressed = compress_with_lookup_tables(&message, &tables).unwrap();
        let expected: Vec<AccountReference> = vec![
            AccountMeta::new_readonly(signer, true).into(),
            AccountLookupMeta::new(writable, table, 2).into(),
            AccountLookupMeta::new_readonly(readonly, table, 1).into(),
            AccountMeta::new_readonly(absent, false).into(),
            AccountMeta::new_readonly(program_id, false).into(),
        ];
        assert_eq!(compressed.instructions[0].accounts, expected);
        // The input is untouched.
        assert_eq!(
            message.instructions[0].accounts[1],
            AccountReference::from(AccountMeta::new(writable, false))
        );
    }

    #[test]
    fn test_first_table_in_collation_order_wins() {
        let key = Pubkey::new_unique();
        let mut table_addresses = [Pubkey::new_unique(), Pubkey::new_unique()];
        table_addresses.sort_by(compare_addresses);
        let [lower, higher] = table_addresses;

        let message = TransactionMessage::default().append_instruction(Instruction::new(
            Pubkey::new_unique(),
            vec![AccountMeta::new(key, false).into()],
            vec![],
        ));
        let tables = HashMap::from([
            (higher, vec![key]),
            (lower, vec![Pubkey::new_unique(), key]),
        ]);
        let compressed = compress_with_lookup_tables(&message, &tables).unwrap();
        assert_eq!(
            compressed.instructions[0].accounts,
            vec![AccountReference::from(AccountLookupMeta::new(key, lower, 1))]
        );
    }

    #[test]
    fn test_legacy_rejected() {
        let message = TransactionMessage::new(TransactionVersion::Legacy);
        assert_eq!(
            compress_with_lookup_tables(&message, &HashMap::new()),
            Err(CompileError::AddressTableLookupsInLegacyMessage)
        );
    }
}
