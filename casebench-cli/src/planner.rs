//! Run Planner
//!
//! Describes what a run would do without invoking anything: the resolved
//! entry point with its signature, and for each testcase how many input
//! values it supplies against the signature length.

use crate::loader::TestSuite;
use casebench_core::SolutionDef;

/// Execution plan for one run
pub struct RunPlan {
    /// `name(kind, ...)`
    pub signature: String,
    /// `file:line` of the registration
    pub location: String,
    /// Module the entry point is declared in
    pub module: String,
    /// Signature length
    pub arity: usize,
    /// Testcases in run order
    pub cases: Vec<PlannedCase>,
}

/// One planned testcase
pub struct PlannedCase {
    /// Testcase key
    pub key: String,
    /// Input values supplied
    pub supplied: usize,
}

/// Build the plan for running `suite` against `solution`
pub fn build_plan(solution: &SolutionDef, suite: &TestSuite) -> RunPlan {
    RunPlan {
        signature: solution.signature_string(),
        location: format!("{}:{}", solution.file, solution.line),
        module: solution.module_path.to_string(),
        arity: (solution.kinds)().len(),
        cases: suite
            .iter()
            .map(|case| PlannedCase {
                key: case.key.clone(),
                supplied: case.arity(),
            })
            .collect(),
    }
}

impl RunPlan {
    /// Tree rendering for `--dry-run`
    pub fn render(&self) -> String {
        let mut out = String::from("Casebench Plan:\n");
        out.push_str(&format!(
            "├── entry: {} in {} ({})\n",
            self.signature, self.module, self.location
        ));

        for case in &self.cases {
            let note = if case.supplied > self.arity {
                format!(", {} ignored", case.supplied - self.arity)
            } else if case.supplied < self.arity {
                format!(", {} zero-filled", self.arity - case.supplied)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "│   ├── {} ({} of {} inputs{})\n",
                case.key, case.supplied, self.arity, note
            ));
        }

        out.push_str(&format!("{} testcases found.\n", self.cases.len()));
        out
    }
}
