//! Protocol descriptor table and the activation set consulted by dispatch.
//!
//! The table is built once at startup from the compiled-in decoder family
//! and never mutated; protocol numbers are dense, 1-based, and stored as an
//! explicit field so lookup never depends on storage position. The
//! activation set owns the live decoder instances; dropping an entry is the
//! decoder's cleanup.

use pf_decoders::{DecodeError, Decoder, DecoderSpec, Tier, BUILTIN};

pub struct ProtocolDescriptor {
    id: u32,
    spec: &'static DecoderSpec,
}

impl ProtocolDescriptor {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn tier(&self) -> Tier {
        self.spec.tier
    }

    fn build(&self, params: Option<&str>) -> Result<Box<dyn Decoder>, DecodeError> {
        (self.spec.build)(params)
    }
}

pub struct DescriptorTable {
    entries: Vec<ProtocolDescriptor>,
}

impl DescriptorTable {
    pub fn builtin() -> Self {
        Self::from_specs(BUILTIN)
    }

    pub fn from_specs(specs: &'static [DecoderSpec]) -> Self {
        let entries = specs
            .iter()
            .enumerate()
            .map(|(pos, spec)| ProtocolDescriptor {
                id: pos as u32 + 1,
                spec,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&ProtocolDescriptor> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ProtocolDescriptor> {
        self.entries.iter()
    }
}

/// One activated protocol, holding the live decoder.
pub struct ActiveProtocol {
    id: u32,
    name: &'static str,
    decoder: Box<dyn Decoder>,
}

impl ActiveProtocol {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decode(&self, payload: &str) -> Result<Vec<pf_decoders::DecodedEvent>, DecodeError> {
        self.decoder.decode(payload)
    }
}

/// Ordered subset of the table eligible for dispatch; at most one entry
/// per protocol number. Re-activating keeps the original position.
#[derive(Default)]
pub struct ActivationSet {
    active: Vec<ActiveProtocol>,
}

impl ActivationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(
        &mut self,
        descriptor: &ProtocolDescriptor,
        params: Option<&str>,
    ) -> Result<(), DecodeError> {
        let entry = ActiveProtocol {
            id: descriptor.id(),
            name: descriptor.name(),
            decoder: descriptor.build(params)?,
        };
        match self.active.iter_mut().find(|p| p.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.active.push(entry),
        }
        Ok(())
    }

    /// Removes and drops the entry; absent ids are a no-op.
    pub fn deactivate(&mut self, id: u32) {
        self.active.retain(|p| p.id != id);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Activates every default-enabled descriptor.
    pub fn activate_defaults(&mut self, table: &DescriptorTable) -> Result<(), DecodeError> {
        for descriptor in table.descriptors() {
            if descriptor.tier().default_enabled() {
                self.activate(descriptor, None)?;
            }
        }
        Ok(())
    }

    /// Force-activates every selectable descriptor regardless of tier.
    pub fn activate_all(&mut self, table: &DescriptorTable) -> Result<(), DecodeError> {
        for descriptor in table.descriptors() {
            if descriptor.tier().selectable() {
                self.activate(descriptor, None)?;
            }
        }
        Ok(())
    }

    pub fn lookup(&self, id: u32) -> Option<&ActiveProtocol> {
        self.active.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.active.iter().map(|p| p.id).collect()
    }
}
