use serde_json::Value;

/// Association changes needed to move from the current link set to the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub to_add: Vec<i32>,
    pub to_remove: Vec<i32>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Coerce one element of a decoded JSON ID list. Integers must fit in i32;
/// fractional numbers are truncated toward zero. Anything else yields `None`.
pub fn coerce_id(value: &Value) -> Option<i32> {
    let Value::Number(n) = value else {
        return None;
    };

    if let Some(i) = n.as_i64() {
        return i32::try_from(i).ok();
    }

    let f = n.as_f64()?.trunc();
    if f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

/// Compare `current` link IDs with the raw `desired` list from an update payload.
///
/// Elements that do not coerce to an ID are skipped without failing the update.
/// `to_add` keeps first-seen order and holds each ID once.
pub fn reconcile(current: &[i32], desired: &[Value]) -> Reconciliation {
    let desired_ids: Vec<i32> = desired
        .iter()
        .filter_map(|raw| {
            let id = coerce_id(raw);
            if id.is_none() {
                tracing::debug!(value = %raw, "Skipping association ID that is not an integer");
            }
            id
        })
        .collect();

    let mut to_add = Vec::new();
    for id in &desired_ids {
        if !current.contains(id) && !to_add.contains(id) {
            to_add.push(*id);
        }
    }

    let to_remove = current
        .iter()
        .copied()
        .filter(|id| !desired_ids.contains(id))
        .collect();

    Reconciliation { to_add, to_remove }
}
