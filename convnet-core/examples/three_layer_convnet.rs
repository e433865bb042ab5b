use convnet_core::{
    classifiers::{LossOutput, ThreeLayerConvNet, ThreeLayerConvNetConfig},
    error::ConvNetError,
    nn::NamedParameters,
    tensor::randn,
    Classifier,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Overfits a small random batch with plain SGD. A correctly wired network
// drives the training accuracy to 1.0 within a few dozen steps.
fn main() -> Result<(), ConvNetError> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(0);
    let config = ThreeLayerConvNetConfig {
        input_dim: (3, 16, 16),
        num_filters: 8,
        filter_size: 3,
        hidden_dim: 50,
        num_classes: 10,
        weight_scale: 1e-2,
        reg: 1e-3,
    };
    let mut net: ThreeLayerConvNet<f32> = ThreeLayerConvNet::new(config, &mut rng)?;
    println!(
        "ThreeLayerConvNet created with {} parameters",
        net.params().num_parameters()
    );

    let num_samples = 20;
    let x = randn(&[num_samples, 3, 16, 16], 1.0, &mut rng)?;
    let labels: Vec<usize> = (0..num_samples).map(|_| rng.gen_range(0..10)).collect();

    if let LossOutput::LossAndGrads { loss, .. } = net.loss(&x, Some(&labels))? {
        println!("Initial loss: {:.4} (ln 10 = {:.4})", loss, 10f32.ln());
    }

    let learning_rate = 0.05_f32;
    let num_steps = 60;
    for step in 0..num_steps {
        let (loss, grads) = net.loss_and_grads(&x, &labels)?;
        for ((_, param), (_, grad)) in net
            .params_mut()
            .named_parameters_mut()
            .into_iter()
            .zip(grads.named_parameters())
        {
            param.add_scaled_(grad, -learning_rate)?;
        }
        if step % 10 == 0 || step + 1 == num_steps {
            println!(
                "Step [{}/{}], Loss: {:.4}, Train accuracy: {:.2}",
                step + 1,
                num_steps,
                loss,
                net.accuracy(&x, &labels)?
            );
        }
    }

    println!("\nTraining finished.");
    Ok(())
}
