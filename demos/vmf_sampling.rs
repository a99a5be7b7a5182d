use manifold_measures::measures::mean_direction;
use manifold_measures::prelude::*;
use ndarray::{arr1, Array1};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    println!("=== von Mises–Fisher on the sphere ===\n");

    let sphere = Manifold::sphere(2);
    let mass = Hausdorff::new(sphere).log_mass().exp();
    println!("vol(S²) = {:.6} (4π = {:.6})\n", mass, 4.0 * std::f64::consts::PI);

    let mu = arr1(&[0.0, 0.0, 1.0]);
    let kappa = 25.0;
    let vmf = VonMisesFisher::from_mode(sphere, mu.clone(), kappa).unwrap();

    let mode = vmf.mode().unwrap();
    println!("mode: {:?}", mode.as_vector().unwrap());
    println!(
        "log-density at the mode:     {:.6}",
        vmf.log_density(&mode).unwrap()
    );
    let equator = Point::Vector(arr1(&[1.0, 0.0, 0.0]));
    println!(
        "log-density at the equator:  {:.6}\n",
        vmf.log_density(&equator).unwrap()
    );

    let mut rng = StdRng::seed_from_u64(1);
    let samples: Vec<Array1<f64>> = (0..2000)
        .map(|_| vmf.sample(&mut rng).unwrap().as_vector().unwrap().clone())
        .collect();

    let direction = mean_direction(&samples).unwrap();
    println!("empirical mean direction of 2000 samples: {:?}", direction);
    println!("⟨μ̂, μ⟩ = {:.6}", direction.dot(&mu));

    println!("\n=== uniform frames on St(4, 2) ===\n");
    let stiefel = Manifold::stiefel(4, 2).unwrap();
    let uniform = Measure::uniform(stiefel);
    let frame = uniform.sample(&mut rng).unwrap();
    println!("one Haar frame:\n{:?}", frame.as_matrix().unwrap());
    println!(
        "on manifold: {}",
        stiefel.is_point(&frame, 1e-10)
    );
}
