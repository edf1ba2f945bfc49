use {
    rayon::prelude::*,
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    txforge::{
        codec::encode_message, compile_message, AccountLookupMeta, AccountMeta, Instruction,
        TransactionMessage, TransactionVersion,
    },
};

fn message() -> TransactionMessage {
    let table = Pubkey::new_unique();
    let instructions = (0..8u8)
        .map(|i| {
            Instruction::new(
                Pubkey::new_unique(),
                vec![
                    AccountMeta::new(Pubkey::new_unique(), i % 3 == 0).into(),
                    AccountMeta::new_readonly(Pubkey::new_unique(), i % 2 == 0).into(),
                    AccountLookupMeta::new_readonly(Pubkey::new_unique(), table, i).into(),
                ],
                vec![i; usize::from(i)],
            )
        })
        .collect::<Vec<_>>();
    TransactionMessage::new(TransactionVersion::V0)
        .with_fee_payer(Pubkey::new_unique())
        .with_blockhash_lifetime(Hash::new_unique(), 1)
        .append_instructions(instructions)
}

#[test]
fn test_parallel_compilation_is_deterministic() {
    solana_logger::setup_with("");

    let message = message();
    let expected = encode_message(&compile_message(&message).unwrap()).unwrap();

    let results = (0..64)
        .into_par_iter()
        .map(|_| encode_message(&compile_message(&message).unwrap()).unwrap())
        .collect::<Vec<_>>();
    assert!(results.iter().all(|bytes| bytes == &expected));
}

#[test]
fn test_parallel_compilation_of_distinct_messages() {
    let messages = (0..32).map(|_| message()).collect::<Vec<_>>();
    let sequential = messages
        .iter()
        .map(|m| compile_message(m).unwrap())
        .collect::<Vec<_>>();
    let parallel = messages
        .par_iter()
        .map(|m| compile_message(m).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(sequential, parallel);
}
