//! Mission registry: the hand-authored catalog plus everything the generator adds.

use pkos_common::{Mission, MissionKind, Theme};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Every mission known to this session, keyed by id
#[derive(Debug, Clone, Default)]
pub struct MissionRegistry {
    missions: BTreeMap<String, Mission>,
    ips: HashSet<String>,
    domains: HashSet<String>,
}

/// Why a mission was refused by the registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate mission id: {0}")]
    DuplicateId(String),
    #[error("duplicate ip: {0}")]
    DuplicateIp(String),
    #[error("duplicate domain: {0}")]
    DuplicateDomain(String),
}

impl MissionRegistry {
    /// Registry holding only the hand-authored missions
    pub fn with_catalog() -> Self {
        let mut registry = Self::default();
        for mission in catalog() {
            // The catalog is static and collision-free
            let _ = registry.insert(mission);
        }
        registry
    }

    pub fn insert(&mut self, mission: Mission) -> Result<(), RegistryError> {
        if self.missions.contains_key(&mission.id) {
            return Err(RegistryError::DuplicateId(mission.id));
        }
        if self.ips.contains(&mission.ip) {
            return Err(RegistryError::DuplicateIp(mission.ip));
        }
        if self.domains.contains(&mission.domain) {
            return Err(RegistryError::DuplicateDomain(mission.domain));
        }
        self.ips.insert(mission.ip.clone());
        self.domains.insert(mission.domain.clone());
        self.missions.insert(mission.id.clone(), mission);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Mission> {
        self.missions.get(id)
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    pub fn ip_taken(&self, ip: &str) -> bool {
        self.ips.contains(ip)
    }

    pub fn domain_taken(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    pub fn find_by_domain(&self, domain: &str) -> Option<&Mission> {
        self.missions.values().find(|m| m.domain == domain)
    }

    pub fn find_by_ip(&self, ip: &str) -> Option<&Mission> {
        self.missions.values().find(|m| m.ip == ip)
    }

    /// Resolve a browser target: exact ip/domain first, then substring
    pub fn resolve_target(&self, target: &str) -> Option<&Mission> {
        self.find_by_ip(target)
            .or_else(|| self.find_by_domain(target))
            .or_else(|| {
                self.missions
                    .values()
                    .find(|m| target.contains(&m.domain) || target.contains(&m.ip))
            })
    }

    /// Ids of generated missions, in generation order
    /// One past the highest `op_<n>` index, so gaps are never reused
    pub fn next_generated_index(&self) -> usize {
        self.missions
            .values()
            .filter_map(|m| m.generated_index())
            .max()
            .map_or(1, |max| max as usize + 1)
    }

    pub fn generated_ids(&self) -> Vec<&str> {
        let mut generated: Vec<&Mission> = self
            .missions
            .values()
            .filter(|m| m.generated_index().is_some())
            .collect();
        generated.sort_by_key(|m| m.generated_index());
        generated.into_iter().map(|m| m.id.as_str()).collect()
    }

    /// Contracts order: hand-authored missions alphabetically, then `op_<n>` numerically
    pub fn sorted(&self) -> Vec<&Mission> {
        let mut all: Vec<&Mission> = self.missions.values().collect();
        all.sort_by(|a, b| contract_order(a, b));
        all
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mission> {
        self.missions.values()
    }
}

fn contract_order(a: &Mission, b: &Mission) -> Ordering {
    match (a.generated_index(), b.generated_index()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.id.cmp(&b.id),
    }
}

#[allow(clippy::too_many_arguments)]
fn standard(
    id: &str,
    ip: &str,
    domain: &str,
    score: u32,
    reward: &str,
    theme: Theme,
    title: &str,
    upload_code: &str,
) -> Mission {
    Mission {
        id: id.to_string(),
        ip: ip.to_string(),
        domain: domain.to_string(),
        title: title.to_string(),
        theme,
        reward: reward.to_string(),
        upload_code: upload_code.to_string(),
        kind: MissionKind::Standard { score },
    }
}

/// Hand-authored missions
#[rustfmt::skip]
pub fn catalog() -> Vec<Mission> {
    vec![
        standard("alpha", "192.168.0.99", "secure.alpha", 0, "payload.txt", Theme::Blue, "SECURE SERVER (ALPHA)", "ALPHA_KEY"),
        standard("gamma", "192.168.0.55", "gamma.net", 10, "gamma_intel.txt", Theme::Purple, "GAMMA NETWORKS", "GAMMA_KEY"),
        standard("delta", "192.168.0.101", "delta.sys", 20, "delta_plans.pdf", Theme::Yellow, "DELTA SYSTEMS", "DELTA_KEY"),
        standard("epsilon", "192.168.0.44", "epsilon.io", 30, "epsilon_key.key", Theme::Orange, "EPSILON IO", "EPSILON_KEY"),
        standard("zeta", "192.168.0.77", "zeta.org", 40, "zeta_coords.csv", Theme::Cyan, "ZETA ORG", "ZETA_KEY"),
        standard("omega", "192.168.0.200", "target.corp", 50, "encrypted_payload.dat", Theme::Red, "SECURE SERVER (OMEGA)", "OMEGA_KEY"),
        standard("eta", "192.168.0.88", "eta.edu", 60, "eta_virus.exe", Theme::Pink, "ETA RESEARCH", "ETA_KEY"),
        standard("theta", "192.168.0.33", "theta.gov", 70, "theta_logs.log", Theme::Brown, "THETA GOV", "THETA_KEY"),
        standard("iota", "192.168.0.11", "iota.mil", 80, "iota_blueprint.cad", Theme::Gray, "IOTA MILITARY", "IOTA_KEY"),
        standard("kappa", "192.168.0.66", "kappa.xyz", 90, "kappa_source.js", Theme::White, "KAPPA LABS", "KAPPA_KEY"),
        Mission {
            id: "deep_web".to_string(),
            ip: "10.0.0.66".to_string(),
            domain: "portal.dark.net".to_string(),
            title: "OPERATION DEEP WEB".to_string(),
            theme: Theme::Red,
            reward: "PROJECT_GENESIS.zip".to_string(),
            upload_code: "GENESIS".to_string(),
            kind: MissionKind::Timed { duration: 300 },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let registry = MissionRegistry::with_catalog();
        assert_eq!(registry.len(), 11);
        assert!(registry.get("deep_web").unwrap().is_timed());
        assert_eq!(registry.find_by_domain("gamma.net").unwrap().id, "gamma");
        assert_eq!(registry.find_by_ip("10.0.0.66").unwrap().id, "deep_web");
    }

    #[test]
    fn test_insert_rejects_collisions() {
        let mut registry = MissionRegistry::with_catalog();
        let mut dup = registry.get("alpha").unwrap().clone();
        assert_eq!(
            registry.insert(dup.clone()),
            Err(RegistryError::DuplicateId("alpha".into()))
        );

        dup.id = "alpha2".into();
        assert_eq!(
            registry.insert(dup.clone()),
            Err(RegistryError::DuplicateIp("192.168.0.99".into()))
        );

        dup.ip = "192.168.1.1".into();
        assert_eq!(
            registry.insert(dup),
            Err(RegistryError::DuplicateDomain("secure.alpha".into()))
        );
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn test_contract_order_puts_catalog_first() {
        let mut registry = MissionRegistry::with_catalog();
        for n in [10, 2, 1] {
            let mut m = registry.get("alpha").unwrap().clone();
            m.id = format!("op_{}", n);
            m.ip = format!("192.168.50.{}", n);
            m.domain = format!("gen{}.io", n);
            registry.insert(m).unwrap();
        }

        let ids: Vec<&str> = registry.sorted().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids[0], "alpha");
        assert_eq!(ids[10], "zeta");
        assert_eq!(&ids[11..], &["op_1", "op_2", "op_10"]);
        assert_eq!(registry.generated_ids(), vec!["op_1", "op_2", "op_10"]);
    }

    #[test]
    fn test_resolve_target_accepts_urls() {
        let registry = MissionRegistry::with_catalog();
        assert_eq!(registry.resolve_target("https://delta.sys/login").unwrap().id, "delta");
        assert!(registry.resolve_target("example.com").is_none());
    }
}
