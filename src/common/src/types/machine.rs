use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    pub count: u32,
    /// MHz as reported by the kickstart record.
    pub speed: u64,
    pub vendor: Option<String>,
}

/// Host a job ran on, keyed by `node_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub system: Option<String>,
    pub architecture: Option<String>,
    pub release: Option<String>,
    #[serde(rename = "nodeName")]
    pub node_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub memory: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cpu: Option<Cpu>,
}

/// First-seen registry of machines. A descriptor whose node name is already
/// known is dropped, never merged into the existing one.
#[derive(Debug, Clone, Default)]
pub struct MachineRegistry {
    machines: Vec<Machine>,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `machine` unless its node name was seen before.
    /// Returns `true` if it was added.
    pub fn insert_if_absent(&mut self, machine: Machine) -> bool {
        if self.contains(&machine.node_name) {
            return false;
        }
        self.machines.push(machine);
        true
    }

    pub fn contains(&self, node_name: &str) -> bool {
        self.machines.iter().any(|m| m.node_name == node_name)
    }

    pub fn get(&self, node_name: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.node_name == node_name)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn into_vec(self) -> Vec<Machine> {
        self.machines
    }
}
