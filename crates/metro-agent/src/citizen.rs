//! The citizen record and its activity state.

use metro_core::{CitizenId, NodeId};

use crate::needs::CitizenNeeds;
use crate::path::CitizenPath;

/// What a citizen is doing right now.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Activity {
    /// At a node with nothing scheduled.
    #[default]
    Idle,
    Sleeping,
    Walking,
    Working,
    InSchool,
}

/// One simulated resident.
#[derive(Clone, Debug)]
pub struct Citizen {
    pub id: CitizenId,
    pub name: String,

    /// Home node; every citizen has one.
    pub home: NodeId,
    /// Workplace node, for employed citizens.
    pub work: Option<NodeId>,
    /// School node, for students.
    pub school: Option<NodeId>,

    /// Current node while not walking.
    pub at: NodeId,
    pub activity: Activity,
    pub needs: CitizenNeeds,
    /// The walk in progress, if any.
    pub path: Option<CitizenPath>,
}

impl Citizen {
    pub fn new(id: CitizenId, name: impl Into<String>, home: NodeId, wallet: f32) -> Self {
        Self {
            id,
            name: name.into(),
            home,
            work: None,
            school: None,
            at: home,
            activity: Activity::Idle,
            needs: CitizenNeeds::rested(wallet),
            path: None,
        }
    }

    pub fn with_work(mut self, work: NodeId) -> Self {
        self.work = Some(work);
        self
    }

    pub fn with_school(mut self, school: NodeId) -> Self {
        self.school = Some(school);
        self
    }

    #[inline]
    pub fn is_walking(&self) -> bool {
        self.path.is_some()
    }

    #[inline]
    pub fn at_home(&self) -> bool {
        !self.is_walking() && self.at == self.home
    }
}
