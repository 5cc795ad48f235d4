//! C8: per-output stealth-address derivation and ringct decoding, used by
//! `get_unspent_outs` (§4.C7, §4.C8).

use crate::crypto;
use crate::db::output::Output;
use crate::error::LwsResult;

/// One projected output, ready to be serialised into the
/// `get_unspent_outs` response.
#[derive(Debug, Clone)]
pub struct ProjectedOutput<'a> {
    pub output: &'a Output,
    pub public_key: [u8; 32],
    pub ringct: Option<RingctFields>,
    pub key_images: Vec<[u8; 32]>,
}

#[derive(Debug, Clone)]
pub struct RingctFields {
    pub commitment: [u8; 32],
    pub mask_enc: [u8; 32],
    pub amount_enc: u64,
}

/// Projects one output for a given account's view key and spend public key
/// (§4.C8's four-step recipe).
pub fn project_output<'a>(
    output: &'a Output,
    view_key: &[u8; 32],
    spend_public: &[u8; 32],
    key_images: Vec<[u8; 32]>,
) -> LwsResult<ProjectedOutput<'a>> {
    let derivation = crypto::key_derivation(&output.tx_public, view_key)?;
    let public_key = crypto::derive_public_key(&derivation, output.index, spend_public)?;

    let ringct = if output.extra.ringct {
        let (mask_enc, amount_enc) =
            crypto::ecdh_encode(&derivation, output.index, &output.ringct_mask, output.amount);
        let commitment = crypto::pedersen_commit(output.amount, &output.ringct_mask)?;
        Some(RingctFields {
            commitment,
            mask_enc,
            amount_enc,
        })
    } else {
        None
    };

    Ok(ProjectedOutput {
        output,
        public_key,
        ringct,
        key_images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::common::{OutputId, TxLink};
    use crate::db::output::ExtraFlags;

    fn sample_output(tx_public: [u8; 32], amount: u64, mask: [u8; 32]) -> Output {
        Output {
            id: OutputId {
                block_height: 1,
                low: 1,
            },
            link: TxLink {
                height: 1,
                tx_hash: [0u8; 32],
            },
            index: 0,
            amount,
            mixin_count: 5,
            timestamp: 0,
            tx_public,
            tx_prefix_hash: [0u8; 32],
            unlock_time: 0,
            extra: ExtraFlags {
                coinbase: false,
                ringct: true,
            },
            ringct_mask: mask,
            payment_id: [0u8; 32],
            payment_id_len: 0,
        }
    }

    #[test]
    fn projector_recovers_amount_and_mask_with_matching_view_key() {
        let tx_secret = [4u8; 32];
        let tx_public = crypto::derive_public(&tx_secret).unwrap();
        let view_secret = [6u8; 32];
        let spend_secret = [8u8; 32];
        let spend_public = crypto::derive_public(&spend_secret).unwrap();

        let output = sample_output(tx_public, 555_000, [2u8; 32]);
        let projected = project_output(&output, &view_secret, &spend_public, vec![]).unwrap();
        let ringct = projected.ringct.unwrap();

        let derivation = crypto::key_derivation(&tx_public, &view_secret).unwrap();
        let (mask, amount) =
            crypto::ecdh_decode(&derivation, output.index, &ringct.mask_enc, ringct.amount_enc);
        assert_eq!(amount, 555_000);
        assert_eq!(mask, [2u8; 32]);
    }

    #[test]
    fn non_ringct_output_has_no_ringct_fields() {
        let tx_secret = [1u8; 32];
        let tx_public = crypto::derive_public(&tx_secret).unwrap();
        let mut output = sample_output(tx_public, 1, [0u8; 32]);
        output.extra.ringct = false;
        let projected =
            project_output(&output, &[2u8; 32], &crypto::derive_public(&[3u8; 32]).unwrap(), vec![])
                .unwrap();
        assert!(projected.ringct.is_none());
    }
}
