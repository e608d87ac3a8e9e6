use std::collections::HashMap;

use wftrace_common::types::job::Job;

/// Jobs in declaration order, addressable by case-folded name.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Vec<Job>,
    index: HashMap<String, usize>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `job` unless a job with the same case-folded name exists.
    /// Returns the index of the job that ends up in the registry.
    pub fn insert(&mut self, job: Job) -> usize {
        if let Some(&idx) = self.index.get(&key(&job.name)) {
            return idx;
        }
        let idx = self.jobs.len();
        self.index.insert(key(&job.name), idx);
        self.jobs.push(job);
        idx
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&key(name)).copied()
    }

    pub fn get(&self, idx: usize) -> Option<&Job> {
        self.jobs.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Job> {
        self.jobs.get_mut(idx)
    }

    /// Records `parent -> child` using the canonical names of both jobs.
    pub fn link(&mut self, parent: usize, child: usize) -> bool {
        let Some(parent_name) = self.jobs.get(parent).map(|job| job.name.clone()) else {
            return false;
        };
        match self.jobs.get_mut(child) {
            Some(job) => job.add_parent(&parent_name),
            None => false,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Job> {
        self.jobs.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }
}
