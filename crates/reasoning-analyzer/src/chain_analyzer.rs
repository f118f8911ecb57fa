//! Impact propagation and critical-node detection over an Analyst argument
//! graph, with memoized downstream-impact DFS and Kahn's-algorithm
//! topological sort.

use std::collections::{HashMap, HashSet, VecDeque};

use reasoning_contracts::{ArgumentNode, NodeImpactAnalysis, ReasoningChainAnalysis, StructuredWeakness, Severity};

/// Confidence inflation is flagged once a child's score exceeds its
/// parent's by more than this many points.
const LOGIC_INFLATION_THRESHOLD: f32 = 3.0;

/// A node is critical once its confidence is below this bar and it has
/// downstream impact, or once a critical weakness is attached to it.
const LOW_CONFIDENCE_BAR: f32 = 6.0;

pub struct ReasoningChainAnalyzer {
    node_map: HashMap<String, ArgumentNode>,
    order: Vec<String>,
    weaknesses: Vec<StructuredWeakness>,
    forward_graph: HashMap<String, Vec<String>>,
    backward_graph: HashMap<String, Vec<String>>,
}

impl ReasoningChainAnalyzer {
    pub fn new(nodes: Vec<ArgumentNode>, weaknesses: Vec<StructuredWeakness>) -> Self {
        let order: Vec<String> = nodes.iter().map(|n| n.node_id.clone()).collect();
        let node_map: HashMap<String, ArgumentNode> =
            nodes.into_iter().map(|n| (n.node_id.clone(), n)).collect();

        let mut forward_graph: HashMap<String, Vec<String>> = HashMap::new();
        let mut backward_graph: HashMap<String, Vec<String>> = HashMap::new();

        for node_id in &order {
            let node = &node_map[node_id];
            for parent_id in &node.depends_on {
                if node_map.contains_key(parent_id) {
                    forward_graph
                        .entry(parent_id.clone())
                        .or_default()
                        .push(node_id.clone());
                    backward_graph
                        .entry(node_id.clone())
                        .or_default()
                        .push(parent_id.clone());
                } else {
                    tracing::warn!(
                        node_id = %short(node_id),
                        parent_id = %short(parent_id),
                        "node references a non-existent parent"
                    );
                }
            }
        }

        Self {
            node_map,
            order,
            weaknesses,
            forward_graph,
            backward_graph,
        }
    }

    /// Nodes as they stand after analysis, including any logic-inflation
    /// warnings appended to `logic_warnings`.
    pub fn annotated_nodes(&self) -> Vec<ArgumentNode> {
        self.order
            .iter()
            .map(|id| self.node_map[id].clone())
            .collect()
    }

    fn children(&self, node_id: &str) -> &[String] {
        self.forward_graph.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn parent_count(&self, node_id: &str) -> usize {
        self.backward_graph.get(node_id).map(Vec::len).unwrap_or(0)
    }

    /// DFS cycle detection using an explicit recursion stack, visiting
    /// every weakly-connected component.
    pub fn detect_cycles(&self) -> (bool, Option<String>) {
        let mut visited: HashSet<&str> = HashSet::new();

        for start in &self.order {
            if visited.contains(start.as_str()) {
                continue;
            }
            let mut rec_stack: HashSet<String> = HashSet::new();
            let mut path: Vec<String> = Vec::new();
            if let Some(cycle_path) = self.dfs_cycle(start, &mut visited, &mut rec_stack, &mut path) {
                let claims: Vec<String> = cycle_path
                    .iter()
                    .take(3)
                    .map(|id| {
                        let claim = &self.node_map[id].claim;
                        let truncated: String = claim.chars().take(30).collect();
                        format!("{truncated}...")
                    })
                    .collect();
                return (true, Some(format!("Cycle detected: {}...", claims.join(" -> "))));
            }
        }

        (false, None)
    }

    fn dfs_cycle<'a>(
        &'a self,
        node_id: &'a str,
        visited: &mut HashSet<&'a str>,
        rec_stack: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        visited.insert(node_id);
        rec_stack.insert(node_id.to_string());
        path.push(node_id.to_string());

        for child_id in self.children(node_id) {
            if !visited.contains(child_id.as_str()) {
                if let Some(cycle) = self.dfs_cycle(child_id, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(child_id) {
                let start_idx = path.iter().position(|p| p == child_id).unwrap_or(0);
                return Some(path[start_idx..].to_vec());
            }
        }

        path.pop();
        rec_stack.remove(node_id);
        None
    }

    fn downstream_impact<'a>(
        &'a self,
        node_id: &'a str,
        memo: &mut HashMap<String, HashSet<String>>,
    ) -> HashSet<String> {
        if let Some(cached) = memo.get(node_id) {
            return cached.clone();
        }

        let mut impact = HashSet::new();
        for child in self.children(node_id) {
            impact.insert(child.clone());
            let child_impact = self.downstream_impact(child, memo);
            impact.extend(child_impact);
        }

        memo.insert(node_id.to_string(), impact.clone());
        impact
    }

    pub fn calculate_impact(&self) -> HashMap<String, NodeImpactAnalysis> {
        let mut impact_map = HashMap::new();
        let mut memo: HashMap<String, HashSet<String>> = HashMap::new();

        for node_id in &self.order {
            let affected = self.downstream_impact(node_id, &mut memo);
            let node = &self.node_map[node_id];
            let (is_critical, reason) = self.is_critical_node(node, affected.len());

            impact_map.insert(
                node_id.clone(),
                NodeImpactAnalysis {
                    node_id: node_id.clone(),
                    affects_count: affected.len(),
                    affected_node_ids: affected.into_iter().collect(),
                    is_critical,
                    criticality_reason: reason,
                },
            );
        }

        impact_map
    }

    fn is_critical_node(&self, node: &ArgumentNode, affects_count: usize) -> (bool, Option<String>) {
        let mut reasons = Vec::new();

        let score = node.effective_score();
        if score < LOW_CONFIDENCE_BAR && affects_count >= 2 {
            reasons.push(format!(
                "low confidence ({score:.1}/10) affects {affects_count} downstream inference(s)"
            ));
        }

        let critical_weaknesses = self
            .weaknesses
            .iter()
            .filter(|w| w.node_id.as_deref() == Some(node.node_id.as_str()))
            .filter(|w| w.severity == Severity::Critical)
            .count();
        if critical_weaknesses > 0 && affects_count >= 1 {
            reasons.push(format!(
                "{critical_weaknesses} critical weakness(es) affect downstream inference"
            ));
        }

        if reasons.is_empty() {
            (false, None)
        } else {
            (true, Some(reasons.join("; ")))
        }
    }

    /// Kahn's algorithm. If the graph has cycles, the remaining nodes (none
    /// of which ever reach in-degree zero) are appended in their original
    /// order so every node still appears exactly once.
    pub fn topological_sort(&self) -> Vec<String> {
        let mut in_degree: HashMap<String, usize> = self
            .order
            .iter()
            .map(|id| (id.clone(), self.parent_count(id)))
            .collect();

        let mut queue: VecDeque<String> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| id.clone())
            .collect();
        // Preserve the original encounter order rather than hash order.
        queue = self
            .order
            .iter()
            .filter(|id| queue.contains(*id))
            .cloned()
            .collect();

        let mut topo_order = Vec::new();

        while let Some(current) = queue.pop_front() {
            topo_order.push(current.clone());
            for child_id in self.children(&current) {
                if let Some(deg) = in_degree.get_mut(child_id) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(child_id.clone());
                    }
                }
            }
        }

        if topo_order.len() < self.order.len() {
            tracing::warn!("topological sort incomplete, likely due to cycles");
            let seen: HashSet<&String> = topo_order.iter().collect();
            for id in &self.order {
                if !seen.contains(id) {
                    topo_order.push(id.clone());
                }
            }
        }

        topo_order
    }

    pub fn calculate_max_depth(&self) -> usize {
        let mut in_degree: HashMap<String, usize> = self
            .order
            .iter()
            .map(|id| (id.clone(), self.parent_count(id)))
            .collect();

        let mut depth: HashMap<String, usize> = HashMap::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        for id in &self.order {
            if in_degree[id] == 0 {
                depth.insert(id.clone(), 0);
                queue.push_back(id.clone());
            }
        }

        while let Some(current) = queue.pop_front() {
            let current_depth = depth[&current];
            for child_id in self.children(&current) {
                if let Some(deg) = in_degree.get_mut(child_id) {
                    let next_depth = depth.get(child_id).copied().unwrap_or(0).max(current_depth + 1);
                    depth.insert(child_id.clone(), next_depth);
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(child_id.clone());
                    }
                }
            }
        }

        depth.values().copied().max().unwrap_or(0)
    }

    /// Weakest-Link check: flags any node whose confidence exceeds a
    /// parent's by more than [`LOGIC_INFLATION_THRESHOLD`], appending a
    /// warning to that node's `logic_warnings`.
    pub fn check_logic_consistency(&mut self) -> usize {
        let mut inconsistency_count = 0;
        let ids = self.order.clone();

        for node_id in ids {
            let depends_on = self.node_map[&node_id].depends_on.clone();
            if depends_on.is_empty() {
                continue;
            }
            let child_score = self.node_map[&node_id].effective_score();

            for parent_id in depends_on {
                let parent_score = match self.node_map.get(&parent_id) {
                    Some(parent) => parent.effective_score(),
                    None => continue,
                };

                if child_score > parent_score + LOGIC_INFLATION_THRESHOLD {
                    let warning = format!(
                        "Confidence inflated relative to premise (parent: {parent_score:.1}, child: {child_score:.1})"
                    );
                    tracing::warn!(
                        node_id = %short(&node_id),
                        parent_id = %short(&parent_id),
                        "logic inflation detected"
                    );
                    if let Some(node) = self.node_map.get_mut(&node_id) {
                        node.logic_warnings.push(warning);
                    }
                    inconsistency_count += 1;
                }
            }
        }

        inconsistency_count
    }

    /// Run the full analysis: cycles, topological order, impact, critical
    /// nodes (sorted by `affects_count` descending), and logic consistency.
    pub fn analyze(&mut self) -> ReasoningChainAnalysis {
        tracing::info!(nodes = self.order.len(), "analyzing reasoning chain");

        let (has_cycles, cycle_details) = self.detect_cycles();
        if has_cycles {
            tracing::warn!(details = ?cycle_details, "cycle detected in reasoning chain");
        }

        let topological_order = self.topological_sort();
        let impact_map = self.calculate_impact();

        let mut critical_nodes: Vec<NodeImpactAnalysis> = impact_map
            .into_values()
            .filter(|impact| impact.is_critical)
            .collect();
        critical_nodes.sort_by(|a, b| b.affects_count.cmp(&a.affects_count));

        if !critical_nodes.is_empty() {
            tracing::warn!(count = critical_nodes.len(), "found critical nodes");
        }

        let logic_inconsistencies = self.check_logic_consistency();
        if logic_inconsistencies > 0 {
            tracing::warn!(count = logic_inconsistencies, "found logic inflation warnings");
        }

        let max_depth = self.calculate_max_depth();
        tracing::info!(max_depth, "reasoning chain depth computed");

        ReasoningChainAnalysis {
            total_nodes: self.order.len(),
            max_depth,
            topological_order,
            critical_nodes,
            has_cycles,
            cycle_details,
            logic_inconsistencies,
        }
    }
}

fn short(id: &str) -> String {
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_contracts::Confidence;

    fn node(id: &str, confidence: Confidence, score: Option<f32>, depends_on: &[&str]) -> ArgumentNode {
        ArgumentNode {
            node_id: id.to_string(),
            claim: format!("claim {id}"),
            confidence,
            confidence_score: score,
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            logic_warnings: Vec::new(),
        }
    }

    #[test]
    fn detects_no_cycle_in_a_dag() {
        let nodes = vec![
            node("a", Confidence::High, None, &[]),
            node("b", Confidence::High, None, &["a"]),
        ];
        let analyzer = ReasoningChainAnalyzer::new(nodes, vec![]);
        let (has_cycles, _) = analyzer.detect_cycles();
        assert!(!has_cycles);
    }

    #[test]
    fn detects_a_cycle() {
        let nodes = vec![
            node("a", Confidence::High, None, &["b"]),
            node("b", Confidence::High, None, &["a"]),
        ];
        let analyzer = ReasoningChainAnalyzer::new(nodes, vec![]);
        let (has_cycles, details) = analyzer.detect_cycles();
        assert!(has_cycles);
        assert!(details.is_some());
    }

    #[test]
    fn topological_sort_orders_parents_before_children() {
        let nodes = vec![
            node("a", Confidence::High, None, &[]),
            node("b", Confidence::High, None, &["a"]),
            node("c", Confidence::High, None, &["b"]),
        ];
        let analyzer = ReasoningChainAnalyzer::new(nodes, vec![]);
        let order = analyzer.topological_sort();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn impact_propagates_downstream_with_memoization() {
        let nodes = vec![
            node("a", Confidence::High, None, &[]),
            node("b", Confidence::High, None, &["a"]),
            node("c", Confidence::High, None, &["b"]),
        ];
        let analyzer = ReasoningChainAnalyzer::new(nodes, vec![]);
        let impact = analyzer.calculate_impact();
        assert_eq!(impact["a"].affects_count, 2);
        assert_eq!(impact["b"].affects_count, 1);
        assert_eq!(impact["c"].affects_count, 0);
    }

    #[test]
    fn low_confidence_node_with_impact_is_critical() {
        let nodes = vec![
            node("a", Confidence::Low, None, &[]),
            node("b", Confidence::High, None, &["a"]),
            node("c", Confidence::High, None, &["a"]),
        ];
        let analyzer = ReasoningChainAnalyzer::new(nodes, vec![]);
        let impact = analyzer.calculate_impact();
        assert!(impact["a"].is_critical);
    }

    #[test]
    fn logic_inflation_is_flagged_when_child_exceeds_parent_by_threshold() {
        let nodes = vec![
            node("a", Confidence::Low, Some(2.0), &[]),
            node("b", Confidence::High, Some(9.0), &["a"]),
        ];
        let mut analyzer = ReasoningChainAnalyzer::new(nodes, vec![]);
        let count = analyzer.check_logic_consistency();
        assert_eq!(count, 1);
        let annotated = analyzer.annotated_nodes();
        let b = annotated.iter().find(|n| n.node_id == "b").unwrap();
        assert_eq!(b.logic_warnings.len(), 1);
    }

    #[test]
    fn max_depth_of_single_node_is_zero() {
        let nodes = vec![node("a", Confidence::High, None, &[])];
        let analyzer = ReasoningChainAnalyzer::new(nodes, vec![]);
        assert_eq!(analyzer.calculate_max_depth(), 0);
    }
}
