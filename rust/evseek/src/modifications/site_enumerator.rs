use crate::errors::ConfigError;

/// Enumerates candidate attachment-site placements for a variable
/// modification on one draft peptide.
///
/// Site lists for ambiguous modifications can be long, and combination
/// counts for several concurrent instances explode factorially, so both
/// variants support a sampling stride: with a positive budget the walk
/// yields a deterministic, uniformly spaced subsample instead of the full
/// set. Restart only by reconstruction; a single instance is single-caller.
#[derive(Debug, Clone)]
pub enum SiteEnumerator {
    Single(SingleSiteWalk),
    Multi(MultiSiteWalk),
}

/// `max(M / budget, 1)`, the spacing that keeps the walk close to the
/// sampling budget.
fn sampling_stride(num_sites: usize, max_sites: Option<usize>) -> Result<usize, ConfigError> {
    match max_sites {
        None => Ok(1),
        Some(0) => Err(ConfigError::InvalidSamplingBudget { budget: 0 }),
        Some(budget) => Ok((num_sites / budget).max(1)),
    }
}

impl SiteEnumerator {
    /// One modification instance walking an ordered admissible-site list.
    pub fn single(sites: Vec<usize>, max_sites: Option<usize>) -> Result<Self, ConfigError> {
        let stride = sampling_stride(sites.len(), max_sites)?;
        Ok(Self::Single(SingleSiteWalk {
            sites,
            stride,
            cursor: 0,
            started: false,
        }))
    }

    /// `num_instances` modification instances at distinct sites, ascending,
    /// without repetition. With `num_instances > sites.len()` there is no
    /// valid placement and the walk is exhausted from the start.
    pub fn multi(
        num_instances: usize,
        sites: Vec<usize>,
        max_sites: Option<usize>,
    ) -> Result<Self, ConfigError> {
        if num_instances == 0 {
            return Err(ConfigError::ExpectedPositiveModificationCount);
        }
        let stride = sampling_stride(sites.len(), max_sites)?;
        let exhausted = num_instances > sites.len();
        Ok(Self::Multi(MultiSiteWalk {
            sites,
            num_instances,
            stride,
            cursors: Vec::new(),
            started: false,
            exhausted,
        }))
    }

    pub fn site_count(&self) -> usize {
        match self {
            Self::Single(walk) => walk.sites.len(),
            Self::Multi(walk) => walk.sites.len(),
        }
    }

    pub fn stride(&self) -> usize {
        match self {
            Self::Single(walk) => walk.stride,
            Self::Multi(walk) => walk.stride,
        }
    }

    /// Overrides the computed sampling stride. Applies to every advance
    /// after the call.
    pub fn set_stride(&mut self, stride: usize) -> Result<(), ConfigError> {
        if stride == 0 {
            return Err(ConfigError::InvalidStride { stride });
        }
        match self {
            Self::Single(walk) => walk.stride = stride,
            Self::Multi(walk) => walk.stride = stride,
        }
        Ok(())
    }
}

impl Iterator for SiteEnumerator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Single(walk) => walk.next_site().map(|site| vec![site]),
            Self::Multi(walk) => walk.next_combination(),
        }
    }
}

/// Strided walk over one ordered site list. Yields `ceil(M / stride)`
/// sites.
#[derive(Debug, Clone)]
pub struct SingleSiteWalk {
    sites: Vec<usize>,
    stride: usize,
    cursor: usize,
    started: bool,
}

impl SingleSiteWalk {
    fn next_site(&mut self) -> Option<usize> {
        if self.started {
            if self.cursor >= self.sites.len() {
                return None;
            }
            self.cursor += self.stride;
        } else {
            self.started = true;
        }
        if self.cursor >= self.sites.len() {
            return None;
        }
        Some(self.sites[self.cursor])
    }
}

/// Strided odometer over index cursors into the site list.
///
/// Advance scans cursors right to left and moves the first one whose
/// stride-step keeps itself and all cursors to its right (stride-spaced)
/// in bounds, then resets the cursors to its right to consecutive
/// stride-spaced successors. With stride 1 this is the full `C(M, N)`
/// lexicographic combination walk.
#[derive(Debug, Clone)]
pub struct MultiSiteWalk {
    sites: Vec<usize>,
    num_instances: usize,
    stride: usize,
    cursors: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl MultiSiteWalk {
    fn current(&self) -> Vec<usize> {
        self.cursors.iter().map(|&ix| self.sites[ix]).collect()
    }

    fn next_combination(&mut self) -> Option<Vec<usize>> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            self.cursors = (0..self.num_instances).collect();
            return Some(self.current());
        }
        let last_ix = self.sites.len() - 1;
        for slot in (0..self.num_instances).rev() {
            let moved = self.cursors[slot] + self.stride;
            // The cursors to the right of `slot` need stride-spaced room.
            let rightmost = moved + (self.num_instances - 1 - slot) * self.stride;
            if rightmost <= last_ix {
                self.cursors[slot] = moved;
                for follow in slot + 1..self.num_instances {
                    self.cursors[follow] = self.cursors[follow - 1] + self.stride;
                }
                return Some(self.current());
            }
        }
        self.exhausted = true;
        None
    }
}
