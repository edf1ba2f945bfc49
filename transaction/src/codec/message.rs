//! Compiled message <-> bytes.

use {
    super::{short_vec, write_short_vec, Reader},
    crate::{
        compile::{AddressTableLookup, CompiledInstruction, CompiledMessage, MessageHeader},
        message::TransactionVersion,
    },
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    txforge_error::CodecError,
};

const VERSION_PREFIX_MASK: u8 = 0x80;
const MAX_VERSION: u8 = 0x7f;

/// Encode a compiled message. Lookups are only written for versioned
/// messages.
pub fn encode_message(message: &CompiledMessage) -> Result<Vec<u8>, CodecError> {
    let mut out = vec![];
    if let TransactionVersion::Number(version) = message.version {
        if version > MAX_VERSION {
            return Err(CodecError::VersionOutOfRange(version));
        }
        out.push(VERSION_PREFIX_MASK | version);
    }

    let MessageHeader {
        num_signer_accounts,
        num_readonly_signer_accounts,
        num_readonly_non_signer_accounts,
    } = message.header;
    out.extend_from_slice(&[
        num_signer_accounts,
        num_readonly_signer_accounts,
        num_readonly_non_signer_accounts,
    ]);

    short_vec::encode_len(message.static_accounts.len(), &mut out)?;
    for address in &message.static_accounts {
        out.extend_from_slice(address.as_ref());
    }

    out.extend_from_slice(message.lifetime_token.as_ref());

    short_vec::encode_len(message.instructions.len(), &mut out)?;
    for instruction in &message.instructions {
        out.push(instruction.program_address_index);
        write_short_vec(&instruction.account_indices, &mut out)?;
        write_short_vec(&instruction.data, &mut out)?;
    }

    if !message.version.is_legacy() {
        short_vec::encode_len(message.address_table_lookups.len(), &mut out)?;
        for lookup in &message.address_table_lookups {
            out.extend_from_slice(lookup.lookup_table_address.as_ref());
            write_short_vec(&lookup.writable_indices, &mut out)?;
            write_short_vec(&lookup.readable_indices, &mut out)?;
        }
    }

    Ok(out)
}

/// Decode a compiled message, rejecting trailing bytes.
pub fn decode_message(bytes: &[u8]) -> Result<CompiledMessage, CodecError> {
    let mut reader = Reader::new(bytes);
    let message = read_message(&mut reader)?;
    match reader.remaining().len() {
        0 => Ok(message),
        count => Err(CodecError::TrailingBytes { count }),
    }
}

pub(crate) fn read_message(reader: &mut Reader) -> Result<CompiledMessage, CodecError> {
    let version = match reader.peek_u8() {
        Some(prefix) if prefix & VERSION_PREFIX_MASK != 0 => {
            reader.read_u8("version")?;
            TransactionVersion::Number(prefix & MAX_VERSION)
        }
        _ => TransactionVersion::Legacy,
    };

    let [num_signer_accounts, num_readonly_signer_accounts, num_readonly_non_signer_accounts] =
        reader.read_array::<3>("header")?;
    let header = MessageHeader {
        num_signer_accounts,
        num_readonly_signer_accounts,
        num_readonly_non_signer_accounts,
    };

    let num_static_accounts = reader.read_len()?;
    let static_accounts = (0..num_static_accounts)
        .map(|_| reader.read_array::<32>("static account").map(Pubkey::from))
        .collect::<Result<Vec<_>, _>>()?;

    let lifetime_token = Hash::new_from_array(reader.read_array::<32>("lifetime token")?);

    let num_instructions = reader.read_len()?;
    let instructions = (0..num_instructions)
        .map(|_| {
            Ok(CompiledInstruction {
                program_address_index: reader.read_u8("program address index")?,
                account_indices: reader.read_short_vec("account indices")?,
                data: reader.read_short_vec("instruction data")?,
            })
        })
        .collect::<Result<Vec<_>, CodecError>>()?;

    let address_table_lookups = if version.is_legacy() {
        vec![]
    } else {
        let num_lookups = reader.read_len()?;
        (0..num_lookups)
            .map(|_| {
                Ok(AddressTableLookup {
                    lookup_table_address: Pubkey::from(
                        reader.read_array::<32>("lookup table address")?,
                    ),
                    writable_indices: reader.read_short_vec("writable indices")?,
                    readable_indices: reader.read_short_vec("readable indices")?,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?
    };

    Ok(CompiledMessage {
        version,
        header,
        static_accounts,
        lifetime_token,
        instructions,
        address_table_lookups,
    })
}
