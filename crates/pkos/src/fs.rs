//! Simulated file system.
//!
//! A single tree rooted at `root`, a working-directory path, and the handful of
//! shell operations the console exposes. Rewards are always written to the root
//! directory.

use pkos_common::FsNode;
use std::collections::BTreeMap;

/// The player's file system
#[derive(Debug, Clone)]
pub struct FileSystem {
    root: FsNode,
    cwd: Vec<String>,
}

impl FileSystem {
    /// Fresh tree as it looks at boot
    pub fn new() -> Self {
        let mut root = BTreeMap::new();
        root.insert(
            "about.txt".to_string(),
            FsNode::file("Identity: PK Operator\nRole: Data Scientist\nLoc: India"),
        );
        root.insert(
            "skills.md".to_string(),
            FsNode::file("# Capabilities\n- Python\n- SQL\n- C++\n- Generative AI\n- Deep Learning"),
        );
        root.insert(
            "projects".to_string(),
            dir([
                ("ibm_analysis.py", "import pandas as pd\n# Advanced Data Analysis Logic"),
                ("drug_discovery.doc", "Computational Drug Discovery Pipeline..."),
                ("usb_toolkit.cpp", "#include <iostream>\n// Portable Tools"),
            ]),
        );
        root.insert(
            "system".to_string(),
            dir([
                ("config.sys", "THEME=GREEN\nAUDIO=ON"),
                ("kernel.log", "System booted successfully.\nAll modules loaded."),
                ("network.log", NETWORK_LOG),
            ]),
        );
        root.insert("secret.txt".to_string(), FsNode::file("The cake is a lie."));
        root.insert("mission_brief.txt".to_string(), FsNode::file(MISSION_BRIEF));

        Self {
            root: FsNode::Dir { children: root },
            cwd: Vec::new(),
        }
    }

    /// Current directory as `/a/b`
    pub fn pwd(&self) -> String {
        format!("/{}", self.cwd.join("/"))
    }

    fn dir_at(&self, path: &[String]) -> Option<&BTreeMap<String, FsNode>> {
        let mut node = &self.root;
        for part in path {
            match node {
                FsNode::Dir { children } => node = children.get(part)?,
                FsNode::File { .. } => return None,
            }
        }
        match node {
            FsNode::Dir { children } => Some(children),
            FsNode::File { .. } => None,
        }
    }

    fn dir_at_mut(&mut self, path: &[String]) -> Option<&mut BTreeMap<String, FsNode>> {
        let mut node = &mut self.root;
        for part in path {
            match node {
                FsNode::Dir { children } => node = children.get_mut(part)?,
                FsNode::File { .. } => return None,
            }
        }
        match node {
            FsNode::Dir { children } => Some(children),
            FsNode::File { .. } => None,
        }
    }

    fn cwd_mut(&mut self) -> Option<&mut BTreeMap<String, FsNode>> {
        let path = self.cwd.clone();
        self.dir_at_mut(&path)
    }

    /// Entries of the working directory; directories carry a trailing `/`
    pub fn ls(&self) -> Result<Vec<String>, String> {
        let dir = self
            .dir_at(&self.cwd)
            .ok_or_else(|| "Error: Invalid directory".to_string())?;
        Ok(dir
            .iter()
            .map(|(name, node)| {
                if node.is_dir() {
                    format!("{}/", name)
                } else {
                    name.clone()
                }
            })
            .collect())
    }

    pub fn cd(&mut self, name: &str) -> Result<(), String> {
        match name {
            ".." => {
                self.cwd.pop();
                Ok(())
            }
            "/" => {
                self.cwd.clear();
                Ok(())
            }
            "." => Ok(()),
            _ => {
                let is_dir = self
                    .dir_at(&self.cwd)
                    .and_then(|dir| dir.get(name))
                    .is_some_and(FsNode::is_dir);
                if is_dir {
                    self.cwd.push(name.to_string());
                    Ok(())
                } else {
                    Err(format!("cd: {}: No such directory", name))
                }
            }
        }
    }

    pub fn cat(&self, name: &str) -> Result<&str, String> {
        match self.dir_at(&self.cwd).and_then(|dir| dir.get(name)) {
            Some(FsNode::File { content }) => Ok(content.as_str()),
            _ => Err(format!("cat: {}: No such file", name)),
        }
    }

    pub fn mkdir(&mut self, name: &str) -> Result<(), String> {
        let dir = self
            .cwd_mut()
            .ok_or_else(|| "Error: Invalid directory".to_string())?;
        if dir.contains_key(name) {
            return Err(format!("mkdir: {}: File exists", name));
        }
        dir.insert(name.to_string(), FsNode::empty_dir());
        Ok(())
    }

    /// Returns true when a new file was created
    pub fn touch(&mut self, name: &str) -> bool {
        match self.cwd_mut() {
            Some(dir) if !dir.contains_key(name) => {
                dir.insert(name.to_string(), FsNode::file(""));
                true
            }
            _ => false,
        }
    }

    pub fn rm(&mut self, name: &str) -> Result<(), String> {
        self.cwd_mut()
            .and_then(|dir| dir.remove(name))
            .map(|_| ())
            .ok_or_else(|| format!("rm: {}: No such file", name))
    }

    /// Whether `name` exists in the working directory
    pub fn exists_here(&self, name: &str) -> bool {
        self.dir_at(&self.cwd)
            .is_some_and(|dir| dir.contains_key(name))
    }

    /// Lookup in the root directory
    pub fn root_file(&self, name: &str) -> Option<&str> {
        match self.dir_at(&[]).and_then(|dir| dir.get(name)) {
            Some(FsNode::File { content }) => Some(content.as_str()),
            _ => None,
        }
    }

    /// Create a root-level file unless the name is taken. Returns true if written.
    pub fn create_root_file_if_absent(&mut self, name: &str, content: String) -> bool {
        let Some(root) = self.dir_at_mut(&[]) else {
            return false;
        };
        if root.contains_key(name) {
            return false;
        }
        root.insert(name.to_string(), FsNode::file(content));
        true
    }

    /// Create or replace a root-level file
    pub fn write_root_file(&mut self, name: &str, content: String) {
        if let Some(root) = self.dir_at_mut(&[]) {
            root.insert(name.to_string(), FsNode::file(content));
        }
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn dir<const N: usize>(files: [(&str, &str); N]) -> FsNode {
    FsNode::Dir {
        children: files
            .into_iter()
            .map(|(name, content)| (name.to_string(), FsNode::file(content)))
            .collect(),
    }
}

const NETWORK_LOG: &str = "DHCP: 192.168.0.105\nGATEWAY: 192.168.0.1\n\nKNOWN TARGETS:\n\
192.168.0.99  [ALPHA]\n192.168.0.55  [GAMMA]\n192.168.0.101 [DELTA]\n192.168.0.44  [EPSILON]\n\
192.168.0.77  [ZETA]\n192.168.0.200 [OMEGA]\n192.168.0.88  [ETA]\n192.168.0.33  [THETA]\n\
192.168.0.11  [IOTA]\n192.168.0.66  [KAPPA]";

const MISSION_BRIEF: &str = "DECA-HEIST CAMPAIGN CONTRACTS:\n\n\
[1] ALPHA (Legacy)\nTarget: 192.168.0.99\nScore: >0\n\n\
[2] GAMMA\nTarget: gamma.net\nScore: >10\n\n\
[3] DELTA\nTarget: delta.sys\nScore: >20\n\n\
[4] EPSILON\nTarget: epsilon.io\nScore: >30\n\n\
[5] ZETA\nTarget: zeta.org\nScore: >40\n\n\
[6] OMEGA (Heist)\nTarget: target.corp\nScore: >50\n\n\
[7] ETA\nTarget: eta.edu\nScore: >60\n\n\
[8] THETA\nTarget: theta.gov\nScore: >70\n\n\
[9] IOTA\nTarget: iota.mil\nScore: >80\n\n\
[10] KAPPA\nTarget: kappa.xyz\nScore: >90";
