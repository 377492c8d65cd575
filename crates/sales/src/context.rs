use wasteflow_core::LeadId;

/// Ambient defaults for a batch creation call, the counterpart of the
/// creation context the surrounding action layer passes along (e.g. when
/// a quotation form is opened from a lead).
#[derive(Clone, Debug, Default)]
pub struct CreateContext {
    pub default_opportunity_id: Option<LeadId>,
}

impl CreateContext {
    pub fn from_lead(lead_id: LeadId) -> Self {
        Self { default_opportunity_id: Some(lead_id) }
    }
}

/// Per-call flags threaded down the write path. The suppress flag marks
/// writes issued by the pickup autofill itself, so the consistency rules
/// neither re-run on them nor flip sync markers for them.
#[derive(Clone, Copy, Debug, Default)]
pub struct WriteContext {
    pub suppress_pickup_autofill: bool,
}

impl WriteContext {
    pub fn suppressing_autofill() -> Self {
        Self { suppress_pickup_autofill: true }
    }
}
