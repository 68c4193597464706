/// Deterministic seat orders for a table of `seats` agents.
pub struct SeatPermutations {
    permutations: Vec<Vec<usize>>,
}

impl SeatPermutations {
    pub fn new(seats: usize, count: usize) -> Self {
        let mut permutations = Vec::with_capacity(count);
        let mut base: Vec<usize> = (0..seats).collect();
        generate(&mut base, 0, count, &mut permutations);
        Self { permutations }
    }

    pub fn as_slice(&self) -> &[Vec<usize>] {
        &self.permutations
    }

    /// Seat order for the `game_index`th game, cycling through the set.
    pub fn for_game(&self, game_index: usize) -> (usize, &[usize]) {
        let index = game_index % self.permutations.len();
        (index, &self.permutations[index])
    }
}

fn generate(data: &mut [usize], start: usize, limit: usize, output: &mut Vec<Vec<usize>>) {
    if output.len() >= limit {
        return;
    }

    if start + 1 >= data.len() {
        output.push(data.to_vec());
        return;
    }

    for idx in start..data.len() {
        data.swap(start, idx);
        generate(data, start + 1, limit, output);
        data.swap(start, idx);
        if output.len() >= limit {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_permutation_is_config_order() {
        let perms = SeatPermutations::new(3, 1);
        assert_eq!(perms.as_slice(), &[vec![0, 1, 2]]);
    }

    #[test]
    fn caps_at_every_ordering() {
        let perms = SeatPermutations::new(3, 100);
        assert_eq!(perms.as_slice().len(), 6);

        let mut seen = perms.as_slice().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn games_cycle_through_orders() {
        let perms = SeatPermutations::new(2, 2);
        assert_eq!(perms.for_game(0), (0, &[0, 1][..]));
        assert_eq!(perms.for_game(3), (1, &[1, 0][..]));
    }
}
