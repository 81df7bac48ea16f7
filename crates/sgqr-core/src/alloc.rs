//! Deterministic assignment of payment-system blocks to top-level tags.
//!
//! The payment-system range is 26 through 50. Allocation is a single pass
//! over the configured templates in input order: a preferred tag is honored
//! or rejected loudly, and a template without a preference gets the lowest
//! tag not yet taken. No shared counters, so equal inputs always produce
//! equal assignments.

use std::collections::BTreeMap;

use crate::error::PayloadError;
use crate::schema;
use crate::template::PaymentSystemTemplate;
use crate::types::Tag;

/// Assign each template its top-level tag. The result is index-aligned
/// with `templates`.
///
/// `reserved` marks tags claimed outside this allocation (a configured
/// SGQR-ID tag inside the range), keyed to a holder label so collision
/// errors can name both parties.
pub fn allocate_tags(
    templates: &[PaymentSystemTemplate],
    reserved: &BTreeMap<Tag, String>,
) -> Result<Vec<Tag>, PayloadError> {
    let mut taken = reserved.clone();
    let mut assigned = Vec::with_capacity(templates.len());

    for template in templates {
        let tag = match template.preferred_tag {
            Some(preferred) => {
                if !schema::is_payment_system_tag(preferred) {
                    return Err(PayloadError::PreferredTagOutOfRange {
                        template: template.label().into(),
                        tag: preferred,
                    });
                }
                if let Some(holder) = taken.get(&preferred) {
                    return Err(PayloadError::TagCollision {
                        tag: preferred,
                        first: holder.clone(),
                        second: template.label().into(),
                    });
                }
                preferred
            }
            None => {
                lowest_free(&taken).ok_or_else(|| PayloadError::AllocationExhausted {
                    template: template.label().into(),
                })?
            }
        };
        tracing::debug!(tag = %tag, template = template.label(), "assigned payment-system tag");
        taken.insert(tag, template.label().into());
        assigned.push(tag);
    }

    Ok(assigned)
}

fn lowest_free(taken: &BTreeMap<Tag, String>) -> Option<Tag> {
    (schema::PAYMENT_SYSTEM_MIN..=schema::PAYMENT_SYSTEM_MAX)
        .map(Tag::known)
        .find(|tag| !taken.contains_key(tag))
}
